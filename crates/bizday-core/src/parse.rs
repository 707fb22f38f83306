//! Input parsing.
//!
//! Timestamps arrive as epoch milliseconds, epoch seconds or RFC3339
//! strings. Close times are strict `HH:MM`; dates are `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::str::FromStr;

use crate::error::{BizDayError, Result};
use crate::models::CloseTime;

/// Supported timestamp formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    /// Unix epoch milliseconds (e.g., "1718690399000")
    #[default]
    EpochMs,
    /// Unix epoch seconds (e.g., "1718690399")
    EpochS,
    /// RFC3339 (e.g., "2024-06-18T01:59:59-04:00")
    Rfc3339,
}

impl std::fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampFormat::EpochMs => write!(f, "epoch_ms"),
            TimestampFormat::EpochS => write!(f, "epoch_s"),
            TimestampFormat::Rfc3339 => write!(f, "rfc3339"),
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = BizDayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "epoch_ms" => Ok(TimestampFormat::EpochMs),
            "epoch_s" => Ok(TimestampFormat::EpochS),
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            _ => Err(BizDayError::ParseError(format!(
                "Unknown format: '{}'. Expected 'epoch_ms', 'epoch_s', or 'rfc3339'",
                s
            ))),
        }
    }
}

/// Parse a timestamp string according to `format`.
///
/// ```
/// use bizday_core::parse::{parse_timestamp, TimestampFormat};
///
/// let a = parse_timestamp("2024-06-18T01:59:59-04:00", TimestampFormat::Rfc3339).unwrap();
/// let b = parse_timestamp("1718690399", TimestampFormat::EpochS).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_timestamp(input: &str, format: TimestampFormat) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();

    match format {
        TimestampFormat::EpochMs => {
            let ms = parse_integer(trimmed, "epoch milliseconds")?;
            Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
                BizDayError::ParseError(format!("Epoch milliseconds out of range: {}", ms))
            })
        }
        TimestampFormat::EpochS => {
            let s = parse_integer(trimmed, "epoch seconds")?;
            Utc.timestamp_opt(s, 0).single().ok_or_else(|| {
                BizDayError::ParseError(format!("Epoch seconds out of range: {}", s))
            })
        }
        TimestampFormat::Rfc3339 => DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                BizDayError::ParseError(format!(
                    "Invalid RFC3339 timestamp: '{}'. Error: {}",
                    trimmed, e
                ))
            }),
    }
}

fn parse_integer(input: &str, what: &str) -> Result<i64> {
    input.parse().map_err(|_| {
        BizDayError::ParseError(format!(
            "Invalid {}: '{}'. Expected integer value.",
            what, input
        ))
    })
}

/// Parse a strict `HH:MM` close time.
///
/// Both components must be exactly two digits; hour in `00..=23`,
/// minute in `00..=59`.
pub fn parse_close_time(input: &str) -> Result<CloseTime> {
    let invalid = || {
        BizDayError::InvalidCloseTime(format!(
            "'{}'. Expected HH:MM on a 24-hour clock",
            input
        ))
    };

    let (hh, mm) = input.split_once(':').ok_or_else(invalid)?;
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hh) || !two_digits(mm) {
        return Err(invalid());
    }

    let hour: u32 = hh.parse().map_err(|_| invalid())?;
    let minute: u32 = mm.parse().map_err(|_| invalid())?;
    CloseTime::new(hour, minute).ok_or_else(invalid)
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| {
        BizDayError::ParseError(format!(
            "Invalid date: '{}'. Expected YYYY-MM-DD. Error: {}",
            trimmed, e
        ))
    })
}
