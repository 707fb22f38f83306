//! Core data types for bizday.
//!
//! - [`LocationTimeConfig`] - Close time and timezone supplied per location
//! - [`CloseTime`] - Validated `HH:MM` close time
//! - [`BusinessDayBounds`] - Inclusive UTC bounds of one operating day
//! - [`OperatingDay`] - Bounds together with the date the day begins on
//! - [`OperatingDayReport`] - String projection used for output
//! - [`BoundsResult`] - Complete result for one input timestamp

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parse::parse_close_time;
use crate::tz::{format_rfc3339_millis, format_rfc3339_utc_millis, parse_tz};

/// Time settings of a single location, as stored by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationTimeConfig {
    /// Local close time, `HH:MM` on a 24-hour clock.
    pub business_close_time: String,
    /// IANA timezone name.
    pub timezone: String,
}

impl LocationTimeConfig {
    pub fn new(business_close_time: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            business_close_time: business_close_time.into(),
            timezone: timezone.into(),
        }
    }

    /// Validate both fields, close time first.
    pub fn validate(&self) -> Result<(CloseTime, Tz)> {
        let close = parse_close_time(&self.business_close_time)?;
        let tz = parse_tz(&self.timezone)?;
        Ok((close, tz))
    }
}

/// Local wall-clock time at which an operating day rolls over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CloseTime {
    hour: u32,
    minute: u32,
}

impl CloseTime {
    /// Midnight close: operating days match calendar days.
    pub const MIDNIGHT: CloseTime = CloseTime { hour: 0, minute: 0 };

    /// Returns `None` when either component is out of range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn is_midnight(&self) -> bool {
        *self == Self::MIDNIGHT
    }
}

impl std::fmt::Display for CloseTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for CloseTime {
    type Err = crate::error::BizDayError;

    fn from_str(s: &str) -> Result<Self> {
        parse_close_time(s)
    }
}

/// Inclusive UTC bounds of one operating day.
///
/// `end` is the next operating day's start minus one millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusinessDayBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusinessDayBounds {
    /// Inclusive membership test.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// An operating day identified by the calendar date it begins on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingDay {
    pub date: NaiveDate,
    pub bounds: BusinessDayBounds,
}

impl OperatingDay {
    /// Render the operating day with local and UTC boundary strings.
    pub fn report(&self, tz: Tz) -> OperatingDayReport {
        OperatingDayReport {
            operating_day: self.date.format("%Y-%m-%d").to_string(),
            start_local: format_rfc3339_millis(&self.bounds.start.with_timezone(&tz)),
            end_local: format_rfc3339_millis(&self.bounds.end.with_timezone(&tz)),
            start_utc: format_rfc3339_utc_millis(&self.bounds.start),
            end_utc: format_rfc3339_utc_millis(&self.bounds.end),
        }
    }
}

/// String projection of an [`OperatingDay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatingDayReport {
    /// Date the operating day begins on, `YYYY-MM-DD`.
    pub operating_day: String,
    /// First instant in local time with offset.
    pub start_local: String,
    /// Last instant in local time with offset.
    pub end_local: String,
    /// First instant in UTC with `Z` suffix.
    pub start_utc: String,
    /// Last instant in UTC with `Z` suffix.
    pub end_utc: String,
}

/// Parsed input timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct InputTimestamp {
    /// Original input string.
    pub ts: String,
    /// Epoch milliseconds (UTC).
    pub epoch_ms: i64,
}

/// Complete result of resolving one timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct BoundsResult {
    pub input: InputTimestamp,
    pub tz: String,
    pub close_time: String,
    pub day: OperatingDayReport,
}
