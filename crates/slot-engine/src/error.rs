//! Error types for slot-engine operations.
//!
//! The scheduling math never fails; these cover the input edges only.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Time(#[from] ParseTimeError),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// A time-of-day string that is not strictly `HH:MM` within 00:00..=23:59.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid time of day '{0}': expected HH:MM between 00:00 and 23:59")]
pub struct ParseTimeError(pub String);

pub type Result<T> = std::result::Result<T, EngineError>;
