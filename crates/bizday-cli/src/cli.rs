use clap::{Parser, Subcommand};

/// Business-day boundary tool
#[derive(Parser, Debug)]
#[command(name = "bizday")]
#[command(version, about = "Operating-day boundaries for locations with a custom close time")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Seconds a resolved operating day stays cached
    #[arg(long, global = true, env = "BIZDAY_CACHE_TTL_SECS", default_value_t = 4 * 60 * 60)]
    pub cache_ttl_secs: u64,

    /// Cached entry count above which stale entries are swept
    #[arg(long, global = true, env = "BIZDAY_SWEEP_THRESHOLD", default_value_t = 100)]
    pub sweep_threshold: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve operating-day bounds for timestamps
    Bounds(BoundsArgs),
    /// Bounds of the current (or previous) operating day
    Today(TodayArgs),
    /// List operating days beginning on each date of a range
    Range(RangeArgs),
    /// Collapse a date range into query bounds
    Collapse(CollapseArgs),
    /// Find the operating day of timestamps, or test membership in one
    Find(FindArgs),
}

#[derive(clap::Args, Debug)]
pub struct LocationArgs {
    /// IANA timezone (e.g., America/New_York)
    #[arg(short, long, default_value = "UTC")]
    pub tz: String,

    /// Business close time, HH:MM on a 24-hour clock
    #[arg(short, long, default_value = "00:00")]
    pub close_time: String,
}

#[derive(clap::Args, Debug)]
pub struct BoundsArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Input format: epoch_ms, epoch_s, rfc3339
    #[arg(short = 'f', long, default_value = "epoch_ms")]
    pub format: String,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,

    /// Input file path (use - for stdin)
    #[arg(long, default_value = "-")]
    pub input: String,
}

#[derive(clap::Args, Debug)]
pub struct TodayArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Resolve the operating day one calendar day ago instead
    #[arg(long)]
    pub yesterday: bool,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct RangeArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// First operating day (inclusive, YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last operating day (inclusive, YYYY-MM-DD)
    #[arg(long)]
    pub end: String,

    /// Output format: json, text
    #[arg(long, default_value = "json")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct CollapseArgs {
    /// IANA timezone; omit to simulate a location without one
    #[arg(short, long)]
    pub tz: Option<String>,

    /// Business close time; omit to simulate a location without one
    #[arg(short, long)]
    pub close_time: Option<String>,

    /// First operating day (inclusive, YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last operating day (inclusive, YYYY-MM-DD)
    #[arg(long)]
    pub end: String,

    /// Fallback when settings are unusable: strict, absent, error
    #[arg(long, default_value = "absent")]
    pub fallback: String,

    /// Output format: json, text
    #[arg(long, default_value = "json")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct FindArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Input format: epoch_ms, epoch_s, rfc3339
    #[arg(short = 'f', long, default_value = "epoch_ms")]
    pub format: String,

    /// Only report whether each timestamp belongs to this operating day
    #[arg(long)]
    pub day: Option<String>,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,

    /// Input file path (use - for stdin)
    #[arg(long, default_value = "-")]
    pub input: String,
}
