use thiserror::Error;

/// Faults a poll cycle can surface.
///
/// Lookups that are expected to miss (a single slot element lacking a
/// date, one field selector not matching) are modelled as `Option` at the
/// call site and never reach this enum; these are the failures worth
/// reporting.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("could not find a {field} field with any known selector")]
    LoginFieldNotFound { field: &'static str },

    #[error("login form submitted but no logged-in marker appeared")]
    LoginVerificationFailed,

    #[error("no live browser session")]
    NoSession,

    #[error("webdriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("invalid notification address: {0}")]
    BadAddress(#[from] lettre::address::AddressError),

    #[error("could not build notification message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("notification delivery failed: {0}")]
    NotificationDelivery(#[from] lettre::transport::smtp::Error),
}
