//! Memoization of resolved operating days.
//!
//! Entries expire lazily: a stale entry is ignored on read but stays in the
//! map until a sweep. A sweep scans the whole map and runs only after an
//! insert pushes the entry count past the configured threshold.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{BusinessDayBounds, CloseTime};

/// Cache tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Age at which an entry stops being served.
    #[serde(rename = "ttl_secs", with = "duration_secs")]
    pub ttl: Duration,
    /// Entry count above which an insert triggers a sweep.
    pub sweep_threshold: usize,
}

impl CacheConfig {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(4 * 60 * 60);
    pub const DEFAULT_SWEEP_THRESHOLD: usize = 100;
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Self::DEFAULT_TTL,
            sweep_threshold: Self::DEFAULT_SWEEP_THRESHOLD,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Identifies one operating day of one location configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub timezone: String,
    pub close_time: CloseTime,
    /// Date the operating day begins on.
    pub date: NaiveDate,
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.timezone,
            self.close_time,
            self.date.format("%Y-%m-%d")
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    bounds: BusinessDayBounds,
    created_at: DateTime<Utc>,
}

/// Snapshot of the cache for monitoring and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    /// Rendered keys, sorted.
    pub keys: Vec<String>,
}

/// TTL map of resolved bounds, safe to share between threads.
#[derive(Debug, Default)]
pub struct BoundsCache {
    config: CacheConfig,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl BoundsCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        // The map holds plain values, so a panic mid-update cannot leave it
        // inconsistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        let age = (now - entry.created_at).to_std().unwrap_or(Duration::ZERO);
        age >= self.config.ttl
    }

    /// Cached bounds for `key`, unless missing or older than the TTL.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<BusinessDayBounds> {
        let entries = self.lock();
        let entry = entries.get(key)?;
        if self.is_stale(entry, now) {
            debug!(%key, "cache entry stale");
            return None;
        }
        Some(entry.bounds)
    }

    /// Insert or replace `key`, sweeping when the map grew past the threshold.
    pub fn put(&self, key: CacheKey, bounds: BusinessDayBounds, now: DateTime<Utc>) {
        let mut entries = self.lock();
        entries.insert(
            key,
            CacheEntry {
                bounds,
                created_at: now,
            },
        );
        if entries.len() > self.config.sweep_threshold {
            self.sweep_locked(&mut entries, now);
        }
    }

    /// Remove every stale entry. Returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        self.sweep_locked(&mut entries, now)
    }

    fn sweep_locked(&self, entries: &mut HashMap<CacheKey, CacheEntry>, now: DateTime<Utc>) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !self.is_stale(entry, now));
        let removed = before - entries.len();
        debug!(removed, remaining = entries.len(), "swept bounds cache");
        removed
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let mut keys: Vec<String> = entries.keys().map(ToString::to_string).collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(day: u32) -> CacheKey {
        CacheKey {
            timezone: "America/New_York".to_string(),
            close_time: CloseTime::new(2, 0).unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        }
    }

    fn bounds() -> BusinessDayBounds {
        BusinessDayBounds {
            start: Utc.with_ymd_and_hms(2024, 6, 17, 6, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 18, 5, 59, 59).unwrap(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(14_400));
        assert_eq!(config.sweep_threshold, 100);
    }

    #[test]
    fn config_from_json_with_partial_fields() {
        let config: CacheConfig = serde_json::from_str(r#"{"ttl_secs": 60}"#).unwrap();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.sweep_threshold, 100);
    }

    #[test]
    fn get_returns_fresh_entry() {
        let cache = BoundsCache::default();
        cache.put(key(17), bounds(), t0());
        assert_eq!(cache.get(&key(17), t0()), Some(bounds()));
        assert_eq!(cache.get(&key(18), t0()), None);
    }

    #[test]
    fn stale_entry_is_ignored_but_kept() {
        let cache = BoundsCache::default();
        cache.put(key(17), bounds(), t0());

        let later = t0() + chrono::Duration::hours(4);
        assert_eq!(cache.get(&key(17), later), None);
        assert_eq!(cache.stats().size, 1);

        assert_eq!(cache.sweep(later), 1);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn put_past_threshold_sweeps_stale_entries() {
        let cache = BoundsCache::new(CacheConfig {
            ttl: Duration::from_secs(60),
            sweep_threshold: 2,
        });
        cache.put(key(1), bounds(), t0());
        cache.put(key(2), bounds(), t0());

        let later = t0() + chrono::Duration::minutes(5);
        cache.put(key(3), bounds(), later);

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.keys, vec!["America/New_York|02:00|2024-06-03".to_string()]);
    }

    #[test]
    fn put_past_threshold_keeps_fresh_entries() {
        let cache = BoundsCache::new(CacheConfig {
            ttl: Duration::from_secs(60),
            sweep_threshold: 2,
        });
        for day in 1..=5 {
            cache.put(key(day), bounds(), t0());
        }
        assert_eq!(cache.stats().size, 5);
    }

    #[test]
    fn clear_empties_cache() {
        let cache = BoundsCache::default();
        cache.put(key(17), bounds(), t0());
        cache.put(key(18), bounds(), t0());
        cache.clear();
        assert_eq!(cache.stats(), CacheStats { size: 0, keys: vec![] });
    }
}
