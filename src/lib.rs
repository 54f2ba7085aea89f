//! PrairieTest slot monitor
//!
//! Polls the PrairieTest scheduling page on a fixed interval, extracts
//! whatever slot markup it can recognize, and emails the operator when a
//! slot matches the configured preferences.

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod monitor;
pub mod notify;
pub mod session;
pub mod types;

pub use types::*;
