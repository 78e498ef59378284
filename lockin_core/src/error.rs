//! Error types for the lockin_core library.

use chrono::NaiveDate;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lockin_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Date range whose start falls after its end
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Recurrence discriminator not recognized
    #[error("Unsupported recurrence rule: {0:?}")]
    UnsupportedRule(String),

    /// Weekday index outside 0 (Sunday) ..= 6 (Saturday)
    #[error("Invalid weekday index: {0} (expected 0-6, Sunday = 0)")]
    InvalidWeekday(i64),

    /// Calendar date that failed to parse
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Validation window that is malformed or not ordered
    #[error("Invalid validation window: {0}")]
    InvalidWindow(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
