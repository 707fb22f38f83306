//! Operating-day boundary arithmetic.
//!
//! Boundaries are placed on the local wall clock (the close time on a given
//! calendar date) and each one is converted to UTC on its own, so operating
//! days that span a DST transition come out 23 or 25 hours long.
//!
//! A timezone that jumps across a whole local date (Pacific/Apia dropped
//! 2011-12-30) leaves that date with no operating day: its close lands on
//! or after the next date's close. Such dates are reported as skipped.
//!
//! Nothing here caches; see [`crate::resolver`] for the memoized entry
//! points.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{BizDayError, Result};
use crate::models::{BusinessDayBounds, CloseTime};
use crate::tz::{local_date, local_midnight_to_utc, local_to_utc};

/// UTC instant at which the operating day beginning on `date` starts.
pub fn close_instant(date: NaiveDate, close: CloseTime, tz: Tz) -> Result<DateTime<Utc>> {
    if close.is_midnight() {
        return local_midnight_to_utc(date, tz);
    }
    let local = date
        .and_hms_opt(close.hour(), close.minute(), 0)
        .ok_or_else(|| BizDayError::InvalidCloseTime(close.to_string()))?;
    local_to_utc(local, tz)
}

/// Date on which the operating day containing `instant` begins.
///
/// An instant strictly before today's close belongs to the operating day
/// that began yesterday, or the last day before it that was not skipped.
pub fn operating_date(instant: DateTime<Utc>, close: CloseTime, tz: Tz) -> Result<NaiveDate> {
    let today = local_date(instant, tz)?;
    let mut date = if close.is_midnight() || instant >= close_instant(today, close, tz)? {
        today
    } else {
        previous_date(today)?
    };

    while bounds_for_date(date, close, tz)?.is_none() {
        date = previous_date(date)?;
    }
    Ok(date)
}

/// Bounds of the operating day beginning on `date`, or `None` when the
/// date was skipped.
///
/// `end` is the next day's start minus one millisecond.
pub fn bounds_for_date(
    date: NaiveDate,
    close: CloseTime,
    tz: Tz,
) -> Result<Option<BusinessDayBounds>> {
    let next = date
        .succ_opt()
        .ok_or_else(|| BizDayError::OutOfRange(format!("no date after {}", date)))?;

    let start = close_instant(date, close, tz)?;
    let next_start = close_instant(next, close, tz)?;
    if start >= next_start {
        return Ok(None);
    }
    Ok(Some(BusinessDayBounds {
        start,
        end: next_start - Duration::milliseconds(1),
    }))
}

fn previous_date(date: NaiveDate) -> Result<NaiveDate> {
    date.pred_opt()
        .ok_or_else(|| BizDayError::OutOfRange(format!("no date before {}", date)))
}
