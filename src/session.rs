//! Browser session handling: lazy driver startup, login through an
//! SSO-style form whose structure is not known in advance, and
//! verification that the login actually took.

use std::time::Duration;

use thirtyfour::prelude::*;
use thirtyfour::Key;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::MonitorError;

/// Pause after submitting the form before probing for a logged-in marker.
const SETTLE_DELAY: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Email field candidates, tried in order; each gets the configured
/// timeout, since the field may appear only after an SSO redirect.
const EMAIL_SELECTORS: &[&str] = &[
    "input[type='email']",
    "input[name='email']",
    "input[id*='email']",
    "input[placeholder*='email']",
];

/// Password and submit candidates are probed without waiting; by the time
/// the email field exists the rest of the form is rendered.
const PASSWORD_SELECTORS: &[&str] = &[
    "input[type='password']",
    "input[name='password']",
    "input[id*='password']",
];

const SUBMIT_SELECTORS: &[&str] = &[
    "button[type='submit']",
    "input[type='submit']",
    ".login-button",
    "#login-button",
];

/// Any of these present after submit means the login landed.
const LOGIN_MARKERS: &[&str] = &[
    ".dashboard",
    ".user-info",
    ".logout",
    "a[href*='logout']",
    ".welcome",
];

/// Owns the WebDriver handle and the authenticated flag. Exactly one of
/// these exists and only one poll cycle touches it at a time.
pub struct SessionManager {
    config: Config,
    driver: Option<WebDriver>,
    authenticated: bool,
}

impl SessionManager {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            driver: None,
            authenticated: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The live driver, if one has been started.
    pub fn driver(&self) -> Option<&WebDriver> {
        self.driver.as_ref()
    }

    /// Marks the session as needing a fresh login on the next cycle.
    pub fn invalidate(&mut self) {
        self.authenticated = false;
    }

    /// Logs in unless already logged in, returning whether an
    /// authenticated session is available. When the flag is already set
    /// this performs no network action at all. Failures are logged here;
    /// the next cycle retries from scratch.
    pub async fn ensure_session(&mut self) -> bool {
        if self.authenticated {
            return true;
        }
        info!("attempting to log in to {}", self.config.base_url);
        match self.login().await {
            Ok(()) => {
                self.authenticated = true;
                info!("successfully logged in");
                true
            }
            Err(e) => {
                error!("login failed: {e}");
                false
            }
        }
    }

    async fn login(&mut self) -> Result<(), MonitorError> {
        if self.driver.is_none() {
            self.driver = Some(start_driver(&self.config).await?);
        }
        let Some(driver) = self.driver.as_ref() else {
            return Err(MonitorError::NoSession);
        };

        driver.goto(&self.config.base_url).await?;

        let email_input = find_field(driver, EMAIL_SELECTORS, self.config.timeout, "email").await?;
        email_input.clear().await?;
        email_input.send_keys(self.config.school_email.as_str()).await?;

        let password_input = find_present(driver, PASSWORD_SELECTORS)
            .await
            .ok_or(MonitorError::LoginFieldNotFound { field: "password" })?;
        password_input.clear().await?;
        password_input
            .send_keys(self.config.school_password.as_str())
            .await?;

        match find_present(driver, SUBMIT_SELECTORS).await {
            Some(button) => button.click().await?,
            // No recognizable submit control; a newline on the password
            // field usually submits the form anyway.
            None => password_input.send_keys(Key::Enter + "").await?,
        }

        tokio::time::sleep(SETTLE_DELAY).await;

        for marker in LOGIN_MARKERS {
            if driver.find(By::Css(*marker)).await.is_ok() {
                debug!("login confirmed by marker {marker}");
                return Ok(());
            }
        }
        Err(MonitorError::LoginVerificationFailed)
    }

    /// Quits the browser and clears the session state.
    pub async fn close(&mut self) {
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.quit().await {
                warn!("failed to quit browser: {e}");
            }
        }
        self.authenticated = false;
    }
}

async fn start_driver(config: &Config) -> Result<WebDriver, MonitorError> {
    let mut caps = DesiredCapabilities::chrome();
    let mut args = vec![
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--window-size=1920,1080",
        "--disable-blink-features=AutomationControlled",
    ];
    if config.headless {
        args.push("--headless=new");
    }
    for arg in args {
        caps.add_arg(arg)?;
    }

    let driver = WebDriver::new(&config.webdriver_url, caps).await?;
    Ok(driver)
}

/// Tries each selector with the full configured wait and keeps the first hit.
async fn find_field(
    driver: &WebDriver,
    selectors: &[&str],
    timeout: Duration,
    field: &'static str,
) -> Result<WebElement, MonitorError> {
    for candidate in selectors {
        match driver
            .query(By::Css(*candidate))
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
        {
            Ok(element) => {
                debug!("located {field} input via {candidate}");
                return Ok(element);
            }
            Err(_) => continue,
        }
    }
    Err(MonitorError::LoginFieldNotFound { field })
}

/// First selector matching an element already on the page, no waiting.
async fn find_present(driver: &WebDriver, selectors: &[&str]) -> Option<WebElement> {
    for candidate in selectors {
        if let Ok(element) = driver.find(By::Css(*candidate)).await {
            return Some(element);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotCriteria;

    fn test_config() -> Config {
        Config {
            base_url: "https://exam.test/".to_string(),
            school_email: "student@school.edu".to_string(),
            school_password: "hunter2".to_string(),
            smtp_host: "smtp.test".to_string(),
            smtp_port: 587,
            notification_email: "me@test".to_string(),
            email_password: "pw".to_string(),
            check_interval: Duration::from_secs(300),
            criteria: SlotCriteria::default(),
            headless: true,
            timeout: Duration::from_secs(1),
            webdriver_url: "http://localhost:9515".to_string(),
        }
    }

    #[tokio::test]
    async fn ensure_session_is_idempotent_when_authenticated() {
        // No driver exists, so any navigation attempt would error out;
        // returning true twice proves the short-circuit path.
        let mut session = SessionManager {
            config: test_config(),
            driver: None,
            authenticated: true,
        };
        assert!(session.ensure_session().await);
        assert!(session.ensure_session().await);
        assert!(session.driver().is_none());
    }

    #[tokio::test]
    async fn new_session_starts_unauthenticated() {
        let session = SessionManager::new(test_config());
        assert!(!session.is_authenticated());
        assert!(session.driver().is_none());
    }

    #[tokio::test]
    async fn invalidate_clears_the_flag() {
        let mut session = SessionManager {
            config: test_config(),
            driver: None,
            authenticated: true,
        };
        session.invalidate();
        assert!(!session.is_authenticated());
    }
}
