//! Environment-backed configuration, loaded once at startup and immutable
//! for the life of the process.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://us.prairietest.com/";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Desired-slot preferences. An unset field means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct SlotCriteria {
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub school_email: String,
    pub school_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub notification_email: String,
    pub email_password: String,
    pub check_interval: Duration,
    pub criteria: SlotCriteria,
    pub headless: bool,
    pub timeout: Duration,
    pub webdriver_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |name: &str| var(name).filter(|v| !v.is_empty());
        let required = |name: &str| -> Result<String> {
            optional(name).with_context(|| format!("{name} is not set"))
        };

        let smtp_port: u16 = match optional("SMTP_PORT") {
            Some(v) => v.parse().context("SMTP_PORT must be a port number")?,
            None => 587,
        };
        let interval_minutes: u64 = match optional("CHECK_INTERVAL_MINUTES") {
            Some(v) => v
                .parse()
                .context("CHECK_INTERVAL_MINUTES must be a number of minutes")?,
            None => 5,
        };
        let timeout_secs: u64 = match optional("BROWSER_TIMEOUT") {
            Some(v) => v
                .parse()
                .context("BROWSER_TIMEOUT must be a number of seconds")?,
            None => 30,
        };
        let headless = optional("HEADLESS_MODE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        Ok(Config {
            base_url: optional("PRAIRIE_TEST_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            school_email: required("SCHOOL_EMAIL")?,
            school_password: required("SCHOOL_PASSWORD")?,
            smtp_host: optional("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
            notification_email: required("NOTIFICATION_EMAIL")?,
            email_password: required("EMAIL_PASSWORD")?,
            check_interval: Duration::from_secs(interval_minutes * 60),
            criteria: SlotCriteria {
                date: optional("DESIRED_DATE"),
                time: optional("DESIRED_TIME"),
                location: optional("DESIRED_LOCATION"),
            },
            headless,
            timeout: Duration::from_secs(timeout_secs),
            webdriver_url: optional("WEBDRIVER_URL")
                .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
        })
    }

    /// URL of the scheduling page under the configured base URL.
    pub fn schedule_url(&self) -> String {
        if self.base_url.ends_with('/') {
            format!("{}schedule", self.base_url)
        } else {
            format!("{}/schedule", self.base_url)
        }
    }
}
