//! Memoized business-day resolution.
//!
//! [`BusinessDayResolver`] owns its [`BoundsCache`] and [`Clock`]; hosts
//! create one per service instead of sharing global state. Every operation
//! validates the [`LocationTimeConfig`] it is given before touching the
//! cache, and validation failures are returned unchanged.
//!
//! Dates skipped by a timezone change have no operating day: range results
//! leave them out, and [`BusinessDayResolver::resolve_date`] reports
//! [`BizDayError::SkippedDate`].

use std::iter;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::cache::{BoundsCache, CacheConfig, CacheKey, CacheStats};
use crate::clock::{Clock, SystemClock};
use crate::compute::{bounds_for_date, operating_date};
use crate::error::{BizDayError, Result};
use crate::models::{BusinessDayBounds, CloseTime, LocationTimeConfig, OperatingDay};
use crate::tz::{local_date, local_naive, local_to_utc};

/// Resolves operating-day bounds for location configurations.
///
/// ```
/// use bizday_core::prelude::*;
/// use chrono::{TimeZone, Utc};
///
/// let resolver = BusinessDayResolver::new();
/// let config = LocationTimeConfig::new("02:00", "America/New_York");
///
/// // 01:30 local on June 18 still belongs to June 17's operating day.
/// let instant = Utc.with_ymd_and_hms(2024, 6, 18, 5, 30, 0).unwrap();
/// let bounds = resolver.resolve_bounds(&instant, &config).unwrap();
/// assert_eq!(bounds.start, Utc.with_ymd_and_hms(2024, 6, 17, 6, 0, 0).unwrap());
/// ```
#[derive(Debug)]
pub struct BusinessDayResolver<C: Clock = SystemClock> {
    cache: BoundsCache,
    clock: C,
}

impl BusinessDayResolver<SystemClock> {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for BusinessDayResolver<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> BusinessDayResolver<C> {
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            cache: BoundsCache::new(config),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn cache(&self) -> &BoundsCache {
        &self.cache
    }

    /// Drop every cached entry. Call after a location's settings change.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Bounds of the operating day containing `instant`.
    pub fn resolve_bounds<Z: TimeZone>(
        &self,
        instant: &DateTime<Z>,
        config: &LocationTimeConfig,
    ) -> Result<BusinessDayBounds> {
        let (close, tz) = config.validate()?;
        let day = self.operating_day(instant.with_timezone(&Utc), close, tz)?;
        Ok(day.bounds)
    }

    pub fn resolve_bounds_for_today(&self, config: &LocationTimeConfig) -> Result<BusinessDayBounds> {
        self.resolve_bounds(&self.clock.now(), config)
    }

    /// Bounds of the operating day containing this moment one calendar day
    /// ago, measured on the location's wall clock.
    pub fn resolve_bounds_for_yesterday(
        &self,
        config: &LocationTimeConfig,
    ) -> Result<BusinessDayBounds> {
        let (close, tz) = config.validate()?;
        let yesterday = local_naive(self.clock.now(), tz)?
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| BizDayError::OutOfRange("no day before now".to_string()))?;
        let day = self.operating_day(local_to_utc(yesterday, tz)?, close, tz)?;
        Ok(day.bounds)
    }

    /// One entry per calendar day between the local dates of `start` and
    /// `end`, inclusive. Entry *i* is the operating day beginning on day *i*;
    /// skipped dates contribute no entry.
    pub fn resolve_range<Z: TimeZone>(
        &self,
        start: &DateTime<Z>,
        end: &DateTime<Z>,
        config: &LocationTimeConfig,
    ) -> Result<Vec<BusinessDayBounds>> {
        let (_, tz) = config.validate()?;
        let start_date = local_date(start.with_timezone(&Utc), tz)?;
        let end_date = local_date(end.with_timezone(&Utc), tz)?;
        let days = self.resolve_date_range(start_date, end_date, config)?;
        Ok(days.into_iter().map(|day| day.bounds).collect())
    }

    /// Outer envelope of the operating days containing `start` and `end`.
    pub fn collapse_range_to_bounds<Z: TimeZone>(
        &self,
        start: &DateTime<Z>,
        end: &DateTime<Z>,
        config: &LocationTimeConfig,
    ) -> Result<BusinessDayBounds> {
        let (close, tz) = config.validate()?;
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end < start {
            return Err(BizDayError::InvalidRange(format!(
                "end {} is before start {}",
                end, start
            )));
        }

        let first = self.operating_day(start, close, tz)?;
        let last = self.operating_day(end, close, tz)?;
        Ok(BusinessDayBounds {
            start: first.bounds.start,
            end: last.bounds.end,
        })
    }

    /// Date on which the operating day containing `timestamp` begins.
    pub fn find_operating_day<Z: TimeZone>(
        &self,
        timestamp: &DateTime<Z>,
        config: &LocationTimeConfig,
    ) -> Result<NaiveDate> {
        let (close, tz) = config.validate()?;
        let day = self.operating_day(timestamp.with_timezone(&Utc), close, tz)?;
        Ok(day.date)
    }

    /// Whether `timestamp` falls within the operating day beginning on
    /// `operating_day`, bounds inclusive. Always false for a skipped date.
    pub fn is_timestamp_in_operating_day<Z: TimeZone>(
        &self,
        timestamp: &DateTime<Z>,
        operating_day: NaiveDate,
        config: &LocationTimeConfig,
    ) -> Result<bool> {
        let (close, tz) = config.validate()?;
        Ok(self
            .day_for_date(operating_day, close, tz)?
            .is_some_and(|day| day.bounds.contains(timestamp.with_timezone(&Utc))))
    }

    /// The operating day beginning on `date`.
    pub fn resolve_date(&self, date: NaiveDate, config: &LocationTimeConfig) -> Result<OperatingDay> {
        let (close, tz) = config.validate()?;
        self.day_for_date(date, close, tz)?
            .ok_or(BizDayError::SkippedDate(date))
    }

    /// Operating days beginning on each date from `start` to `end` inclusive.
    pub fn resolve_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        config: &LocationTimeConfig,
    ) -> Result<Vec<OperatingDay>> {
        let (close, tz) = config.validate()?;
        if end < start {
            return Err(BizDayError::InvalidRange(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }

        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter_map(|date| self.day_for_date(date, close, tz).transpose())
            .collect()
    }

    /// Envelope from the start of the operating day beginning on `start` to
    /// the end of the one beginning on `end`.
    ///
    /// A skipped date at either end narrows to the nearest real operating
    /// day inside the range.
    pub fn collapse_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        config: &LocationTimeConfig,
    ) -> Result<BusinessDayBounds> {
        let (close, tz) = config.validate()?;
        if end < start {
            return Err(BizDayError::InvalidRange(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }

        let forward = iter::successors(Some(start), |date| date.succ_opt())
            .take_while(|date| *date <= end);
        let backward = iter::successors(Some(end), |date| date.pred_opt())
            .take_while(|date| *date >= start);

        let first = self.first_real_day(forward, close, tz)?;
        let last = self.first_real_day(backward, close, tz)?;
        match (first, last) {
            (Some(first), Some(last)) => Ok(BusinessDayBounds {
                start: first.bounds.start,
                end: last.bounds.end,
            }),
            _ => Err(BizDayError::SkippedDate(start)),
        }
    }

    /// The resolved operating day of `config` containing `instant`.
    pub fn operating_day_for(
        &self,
        instant: DateTime<Utc>,
        config: &LocationTimeConfig,
    ) -> Result<OperatingDay> {
        let (close, tz) = config.validate()?;
        self.operating_day(instant, close, tz)
    }

    fn operating_day(&self, instant: DateTime<Utc>, close: CloseTime, tz: Tz) -> Result<OperatingDay> {
        let date = operating_date(instant, close, tz)?;
        self.day_for_date(date, close, tz)?
            .ok_or(BizDayError::SkippedDate(date))
    }

    fn first_real_day(
        &self,
        mut dates: impl Iterator<Item = NaiveDate>,
        close: CloseTime,
        tz: Tz,
    ) -> Result<Option<OperatingDay>> {
        dates
            .find_map(|date| self.day_for_date(date, close, tz).transpose())
            .transpose()
    }

    /// Cached bounds for the operating day beginning on `date`. Skipped
    /// dates are recomputed each time; they are rare enough not to cache.
    fn day_for_date(
        &self,
        date: NaiveDate,
        close: CloseTime,
        tz: Tz,
    ) -> Result<Option<OperatingDay>> {
        let key = CacheKey {
            timezone: tz.name().to_string(),
            close_time: close,
            date,
        };
        let now = self.clock.now();

        if let Some(bounds) = self.cache.get(&key, now) {
            debug!(%key, "bounds cache hit");
            return Ok(Some(OperatingDay { date, bounds }));
        }

        debug!(%key, "bounds cache miss");
        let Some(bounds) = bounds_for_date(date, close, tz)? else {
            debug!(%key, "date skipped by timezone change");
            return Ok(None);
        };
        self.cache.put(key, bounds, now);
        Ok(Some(OperatingDay { date, bounds }))
    }
}
