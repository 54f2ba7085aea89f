//! One-shot diagnostics for the monitor environment: configuration
//! completeness, SMTP connectivity, WebDriver availability and target
//! site reachability. Run this once before leaving the monitor
//! unattended.

use lettre::transport::smtp::authentication::Credentials;
use lettre::SmtpTransport;
use thirtyfour::prelude::*;

use prairie_monitor::config::Config;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    println!("🧪 Checking PrairieTest slot monitor setup");
    println!("{}", "=".repeat(50));

    println!("🔍 Checking configuration...");
    let config = match Config::from_env() {
        Ok(config) => {
            println!("✅ Configuration loaded");
            config
        }
        Err(e) => {
            println!("❌ Configuration error: {e:#}");
            println!("Populate .env (see config.env.example) and retry.");
            std::process::exit(1);
        }
    };

    let mut passed = 1;
    let total = 4;

    if check_smtp(&config).await {
        passed += 1;
    }
    if check_webdriver(&config).await {
        passed += 1;
    }
    if check_site(&config).await {
        passed += 1;
    }

    println!("{}", "=".repeat(50));
    println!("📊 {passed}/{total} checks passed");

    if passed == total {
        println!("🎉 All checks passed. Ready to run the monitor.");
    } else {
        println!("⚠️  Some checks failed. Fix the issues above first.");
        std::process::exit(1);
    }
}

async fn check_smtp(config: &Config) -> bool {
    println!("🔍 Checking SMTP connection...");

    let host = config.smtp_host.clone();
    let port = config.smtp_port;
    let credentials = Credentials::new(
        config.notification_email.clone(),
        config.email_password.clone(),
    );

    let result = tokio::task::spawn_blocking(move || {
        let mailer = SmtpTransport::starttls_relay(&host)?
            .port(port)
            .credentials(credentials)
            .build();
        mailer.test_connection()
    })
    .await;

    match result {
        Ok(Ok(true)) => {
            println!("✅ SMTP connection successful");
            true
        }
        Ok(Ok(false)) => {
            println!("❌ SMTP server did not respond to NOOP");
            false
        }
        Ok(Err(e)) => {
            println!("❌ SMTP connection failed: {e}");
            println!("Check the mail account's app password.");
            false
        }
        Err(e) => {
            println!("❌ SMTP check did not complete: {e}");
            false
        }
    }
}

async fn check_webdriver(config: &Config) -> bool {
    println!("🔍 Checking WebDriver at {}...", config.webdriver_url);

    let mut caps = DesiredCapabilities::chrome();
    let args = vec!["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"];
    for arg in args {
        if let Err(e) = caps.add_arg(arg) {
            println!("❌ Could not build browser capabilities: {e}");
            return false;
        }
    }

    match WebDriver::new(&config.webdriver_url, caps).await {
        Ok(driver) => {
            let quit = driver.quit().await;
            if let Err(e) = quit {
                println!("❌ Browser started but failed to quit cleanly: {e}");
                return false;
            }
            println!("✅ WebDriver session started and closed");
            true
        }
        Err(e) => {
            println!("❌ Could not start a WebDriver session: {e}");
            println!("Is chromedriver running at {}?", config.webdriver_url);
            false
        }
    }
}

async fn check_site(config: &Config) -> bool {
    println!("🔍 Checking connectivity to {}...", config.base_url);

    match reqwest::get(config.base_url.as_str()).await {
        Ok(response) if response.status().is_success() => {
            println!("✅ Site is reachable");
            true
        }
        Ok(response) => {
            println!("❌ Site returned status {}", response.status());
            false
        }
        Err(e) => {
            println!("❌ Cannot reach site: {e}");
            false
        }
    }
}
