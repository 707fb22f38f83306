//! Query bounds for report date-range filters.
//!
//! The resolver itself never substitutes defaults. This module is where a
//! caller decides what happens when a location has no close time or
//! timezone on record, or when the stored values are malformed.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Clock;
use crate::error::{BizDayError, Result};
use crate::models::{BusinessDayBounds, LocationTimeConfig};
use crate::resolver::BusinessDayResolver;
use crate::tz::{local_midnight_to_utc, parse_tz};

/// Location time settings as loaded from storage; either may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSettings {
    pub business_close_time: Option<String>,
    pub timezone: Option<String>,
}

impl LocationSettings {
    pub fn new(business_close_time: Option<&str>, timezone: Option<&str>) -> Self {
        Self {
            business_close_time: business_close_time.map(str::to_string),
            timezone: timezone.map(str::to_string),
        }
    }

    /// Complete configuration, or the name of the first missing field.
    fn to_config(&self) -> std::result::Result<LocationTimeConfig, &'static str> {
        match (&self.business_close_time, &self.timezone) {
            (Some(close), Some(tz)) => Ok(LocationTimeConfig::new(close.as_str(), tz.as_str())),
            (None, _) => Err("businessCloseTime"),
            (_, None) => Err("timezone"),
        }
    }
}

/// What to do when business-day bounds cannot be computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Absent or malformed settings are errors.
    Strict,
    /// Absent settings fall back to calendar midnight; malformed ones fail.
    #[default]
    MidnightWhenAbsent,
    /// Any failure falls back to calendar midnight.
    MidnightOnError,
}

impl std::fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackPolicy::Strict => write!(f, "strict"),
            FallbackPolicy::MidnightWhenAbsent => write!(f, "midnight_when_absent"),
            FallbackPolicy::MidnightOnError => write!(f, "midnight_on_error"),
        }
    }
}

/// How a set of query bounds was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsSource {
    BusinessDay,
    CalendarMidnight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryBounds {
    #[serde(flatten)]
    pub bounds: BusinessDayBounds,
    pub source: BoundsSource,
}

/// Translate a picked calendar range into inclusive UTC query bounds.
///
/// Each date names the operating day that begins on it.
pub fn query_bounds<C: Clock>(
    resolver: &BusinessDayResolver<C>,
    start: NaiveDate,
    end: NaiveDate,
    settings: &LocationSettings,
    policy: FallbackPolicy,
) -> Result<QueryBounds> {
    if end < start {
        return Err(BizDayError::InvalidRange(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }

    let config = match settings.to_config() {
        Ok(config) => config,
        Err(field) => {
            if policy == FallbackPolicy::Strict {
                return Err(BizDayError::MissingConfig(field.to_string()));
            }
            warn!(field, "location setting absent, using calendar midnight bounds");
            return midnight_bounds(start, end, settings);
        }
    };

    match resolver.collapse_dates(start, end, &config) {
        Ok(bounds) => Ok(QueryBounds {
            bounds,
            source: BoundsSource::BusinessDay,
        }),
        Err(err) if policy == FallbackPolicy::MidnightOnError => {
            warn!(error = %err, "business-day resolution failed, using calendar midnight bounds");
            midnight_bounds(start, end, settings)
        }
        Err(err) => Err(err),
    }
}

/// Plain calendar-day bounds in the configured timezone, or UTC when it is
/// unset or unknown.
fn midnight_bounds(start: NaiveDate, end: NaiveDate, settings: &LocationSettings) -> Result<QueryBounds> {
    let tz = settings
        .timezone
        .as_deref()
        .and_then(|name| parse_tz(name).ok())
        .unwrap_or(Tz::UTC);
    let after_end = end
        .succ_opt()
        .ok_or_else(|| BizDayError::OutOfRange(format!("no date after {}", end)))?;

    Ok(QueryBounds {
        bounds: BusinessDayBounds {
            start: local_midnight_to_utc(start, tz)?,
            end: local_midnight_to_utc(after_end, tz)? - Duration::milliseconds(1),
        },
        source: BoundsSource::CalendarMidnight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn june_17_18(
        settings: &LocationSettings,
        policy: FallbackPolicy,
    ) -> Result<QueryBounds> {
        let resolver = BusinessDayResolver::new();
        query_bounds(&resolver, date(2024, 6, 17), date(2024, 6, 18), settings, policy)
    }

    #[test]
    fn complete_settings_use_business_day() {
        let settings = LocationSettings::new(Some("02:00"), Some("America/New_York"));
        for policy in [
            FallbackPolicy::Strict,
            FallbackPolicy::MidnightWhenAbsent,
            FallbackPolicy::MidnightOnError,
        ] {
            let result = june_17_18(&settings, policy).unwrap();
            assert_eq!(result.source, BoundsSource::BusinessDay);
            assert_eq!(result.bounds.start, Utc.with_ymd_and_hms(2024, 6, 17, 6, 0, 0).unwrap());
            assert_eq!(
                result.bounds.end,
                Utc.with_ymd_and_hms(2024, 6, 19, 6, 0, 0).unwrap() - Duration::milliseconds(1)
            );
        }
    }

    #[test]
    fn strict_rejects_absent_settings() {
        let settings = LocationSettings::new(None, Some("America/New_York"));
        match june_17_18(&settings, FallbackPolicy::Strict) {
            Err(BizDayError::MissingConfig(field)) => assert_eq!(field, "businessCloseTime"),
            other => panic!("Expected MissingConfig, got {:?}", other),
        }
    }

    #[test]
    fn absent_settings_fall_back_to_local_midnight() {
        let settings = LocationSettings::new(None, Some("America/New_York"));
        let result = june_17_18(&settings, FallbackPolicy::MidnightWhenAbsent).unwrap();

        assert_eq!(result.source, BoundsSource::CalendarMidnight);
        assert_eq!(result.bounds.start, Utc.with_ymd_and_hms(2024, 6, 17, 4, 0, 0).unwrap());
        assert_eq!(
            result.bounds.end,
            Utc.with_ymd_and_hms(2024, 6, 19, 4, 0, 0).unwrap() - Duration::milliseconds(1)
        );
    }

    #[test]
    fn absent_timezone_falls_back_to_utc_midnight() {
        let settings = LocationSettings::new(Some("02:00"), None);
        let result = june_17_18(&settings, FallbackPolicy::MidnightWhenAbsent).unwrap();
        assert_eq!(result.bounds.start, Utc.with_ymd_and_hms(2024, 6, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn malformed_settings_fail_unless_policy_allows() {
        let settings = LocationSettings::new(Some("25:00"), Some("America/New_York"));

        let err = june_17_18(&settings, FallbackPolicy::MidnightWhenAbsent).unwrap_err();
        assert!(err.is_validation());

        let result = june_17_18(&settings, FallbackPolicy::MidnightOnError).unwrap();
        assert_eq!(result.source, BoundsSource::CalendarMidnight);
        assert_eq!(result.bounds.start, Utc.with_ymd_and_hms(2024, 6, 17, 4, 0, 0).unwrap());
    }

    #[test]
    fn unknown_timezone_with_fallback_uses_utc() {
        let settings = LocationSettings::new(Some("02:00"), Some("Not/AZone"));
        let result = june_17_18(&settings, FallbackPolicy::MidnightOnError).unwrap();
        assert_eq!(result.bounds.start, Utc.with_ymd_and_hms(2024, 6, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn reversed_dates_are_rejected_regardless_of_policy() {
        let resolver = BusinessDayResolver::new();
        let result = query_bounds(
            &resolver,
            date(2024, 6, 18),
            date(2024, 6, 17),
            &LocationSettings::default(),
            FallbackPolicy::MidnightOnError,
        );
        assert!(matches!(result, Err(BizDayError::InvalidRange(_))));
    }

    #[test]
    fn settings_deserialize_with_missing_fields() {
        let settings: LocationSettings =
            serde_json::from_str(r#"{"timezone":"Europe/Berlin"}"#).unwrap();
        assert_eq!(settings, LocationSettings::new(None, Some("Europe/Berlin")));
    }

    #[test]
    fn policy_serialization() {
        assert_eq!(
            serde_json::to_string(&FallbackPolicy::MidnightOnError).unwrap(),
            "\"midnight_on_error\""
        );
        assert_eq!(FallbackPolicy::default(), FallbackPolicy::MidnightWhenAbsent);
    }
}
