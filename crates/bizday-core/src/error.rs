//! Error types for bizday-core.
//!
//! Validation failures (malformed close time, unknown timezone) are kept
//! apart from input parsing and range errors so callers can decide which
//! ones deserve a fallback.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for business-day operations.
#[derive(Debug, Error)]
pub enum BizDayError {
    /// Close time is not `HH:MM` or has out-of-range components.
    #[error("Invalid close time: {0}")]
    InvalidCloseTime(String),

    /// Timezone is not a known IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A required location setting was not supplied.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// Error parsing a timestamp or date input.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Range whose end precedes its start.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Date arithmetic left the range chrono can represent.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// A timezone change jumped over the whole operating day of this date.
    #[error("No operating day begins on {0}")]
    SkippedDate(NaiveDate),
}

impl BizDayError {
    /// True for errors caused by a malformed location configuration.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BizDayError::InvalidCloseTime(_) | BizDayError::InvalidTimezone(_)
        )
    }

    /// Short machine-readable category, stable across message wording.
    pub fn kind(&self) -> &'static str {
        match self {
            BizDayError::InvalidCloseTime(_) | BizDayError::InvalidTimezone(_) => "validation",
            BizDayError::MissingConfig(_) => "missing_config",
            BizDayError::ParseError(_) => "parse",
            BizDayError::InvalidRange(_) => "invalid_range",
            BizDayError::OutOfRange(_) => "out_of_range",
            BizDayError::SkippedDate(_) => "skipped_date",
        }
    }
}

/// Result type alias for business-day operations.
pub type Result<T> = std::result::Result<T, BizDayError>;
