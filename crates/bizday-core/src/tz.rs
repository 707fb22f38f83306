//! Timezone handling utilities.
//!
//! Parsing of IANA names and conversion of local wall-clock times to UTC
//! with a fixed policy for DST gaps and overlaps.

use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{BizDayError, Result};

/// Parse an IANA timezone name into a [`chrono_tz::Tz`].
///
/// # Examples
///
/// ```
/// use bizday_core::tz::parse_tz;
///
/// let tz = parse_tz("America/New_York").unwrap();
/// assert_eq!(tz.to_string(), "America/New_York");
/// assert!(parse_tz("Not/AZone").is_err());
/// ```
pub fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| BizDayError::InvalidTimezone(name.to_string()))
}

/// Convert a local wall-clock time in `tz` to UTC.
///
/// Ambiguous times (fall back) resolve to the earlier occurrence.
/// Nonexistent times (spring forward) move forward by the length of the
/// gap, so 02:30 in a 02:00-03:00 gap becomes 03:30.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            // Offset in force a day before the gap.
            let day_before = local
                .checked_sub_signed(Duration::days(1))
                .ok_or_else(|| out_of_range(local))?;
            let offset = tz.offset_from_utc_datetime(&day_before).fix();
            local
                .checked_sub_offset(offset)
                .map(|utc| utc.and_utc())
                .ok_or_else(|| out_of_range(local))
        }
    }
}

/// UTC instant of local midnight at the start of `date`.
pub fn local_midnight_to_utc(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    local_to_utc(date.and_time(NaiveTime::MIN), tz)
}

/// Wall-clock reading of `instant` in `tz`.
///
/// Fails instead of panicking when the local reading falls outside the
/// range chrono can represent.
pub fn local_naive(instant: DateTime<Utc>, tz: Tz) -> Result<NaiveDateTime> {
    let utc = instant.naive_utc();
    let offset = tz.offset_from_utc_datetime(&utc).fix();
    utc.checked_add_offset(offset).ok_or_else(|| {
        BizDayError::OutOfRange(format!("{} has no local time in {}", instant, tz.name()))
    })
}

/// Calendar date of `instant` on the wall clock of `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> Result<NaiveDate> {
    local_naive(instant, tz).map(|local| local.date())
}

fn out_of_range(local: NaiveDateTime) -> BizDayError {
    BizDayError::OutOfRange(format!("local time {} cannot be placed in UTC", local))
}

/// Format a datetime as RFC3339 with milliseconds and offset.
///
/// e.g. `2024-06-17T02:00:00.000-04:00`
pub fn format_rfc3339_millis<T: TimeZone>(dt: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Format a UTC datetime as RFC3339 with milliseconds and `Z` suffix.
pub fn format_rfc3339_utc_millis(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
