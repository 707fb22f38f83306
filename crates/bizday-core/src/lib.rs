//! # bizday-core
//!
//! Business-day boundary resolution for bars and restaurants whose
//! operating day does not end at midnight.
//!
//! A location supplies a close time (`HH:MM`) and an IANA timezone. An
//! operating day starts at the close time on its calendar date and ends one
//! millisecond before the close time on the next date, so with a `02:00`
//! close a sale at 01:30 on June 18 counts towards June 17.
//!
//! ## Features
//!
//! - **DST Safety**: Boundaries are placed on the local wall clock and each
//!   converted to UTC on its own.
//! - **Reverse Lookup**: Find the operating day a timestamp belongs to.
//! - **Memoization**: Resolved days are cached per resolver with a TTL.
//! - **Explicit Fallbacks**: Calendar-midnight substitution is a caller
//!   policy in [`filter`], never done by the resolver.
//!
//! ## Example
//!
//! ```rust
//! use bizday_core::prelude::*;
//!
//! let resolver = BusinessDayResolver::new();
//! let config = LocationTimeConfig::new("02:00", "Europe/Berlin");
//!
//! let instant = parse_timestamp("2026-03-29T00:15:00Z", TimestampFormat::Rfc3339).unwrap();
//! let day = resolver.find_operating_day(&instant, &config).unwrap();
//!
//! // 01:15 local is still the previous operating day.
//! assert_eq!(day.to_string(), "2026-03-28");
//! ```

pub mod cache;
pub mod clock;
pub mod compute;
pub mod error;
pub mod filter;
pub mod models;
pub mod parse;
pub mod resolver;
pub mod tz;

// Re-export commonly used types at the crate root
pub use cache::{BoundsCache, CacheConfig, CacheStats};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BizDayError, Result};
pub use filter::{BoundsSource, FallbackPolicy, LocationSettings, QueryBounds, query_bounds};
pub use models::{
    BoundsResult, BusinessDayBounds, CloseTime, InputTimestamp, LocationTimeConfig, OperatingDay,
    OperatingDayReport,
};
pub use parse::{TimestampFormat, parse_close_time, parse_date, parse_timestamp};
pub use resolver::BusinessDayResolver;

/// Prelude module for convenient imports.
///
/// ```
/// use bizday_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cache::CacheConfig;
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::error::{BizDayError, Result};
    pub use crate::filter::{FallbackPolicy, LocationSettings, QueryBounds, query_bounds};
    pub use crate::models::*;
    pub use crate::parse::{TimestampFormat, parse_close_time, parse_date, parse_timestamp};
    pub use crate::resolver::BusinessDayResolver;
    pub use crate::tz::parse_tz;
}
