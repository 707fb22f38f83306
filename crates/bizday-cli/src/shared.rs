use std::fs::File;
use std::io::{self, BufRead, BufReader};

use bizday_core::{
    BusinessDayResolver, CacheConfig, FallbackPolicy, LocationTimeConfig, TimestampFormat,
    parse_date,
};
use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::cli::{GlobalArgs, LocationArgs};
use crate::error::{CliError, CliResult};

pub fn build_resolver(global: &GlobalArgs) -> BusinessDayResolver {
    BusinessDayResolver::with_config(CacheConfig {
        ttl: std::time::Duration::from_secs(global.cache_ttl_secs),
        sweep_threshold: global.sweep_threshold,
    })
}

/// Validated location settings plus the parsed timezone for rendering.
pub fn location_config(args: &LocationArgs) -> CliResult<(LocationTimeConfig, Tz)> {
    let config = LocationTimeConfig::new(args.close_time.as_str(), args.tz.as_str());
    let (_, tz) = config.validate()?;
    Ok((config, tz))
}

pub fn parse_format(s: &str) -> CliResult<TimestampFormat> {
    s.parse::<TimestampFormat>()
        .map_err(|_| CliError::input(format!(
            "Invalid format '{}'. Expected: epoch_ms, epoch_s, rfc3339",
            s
        )))
}

/// Accepts the short flag spelling or the policy's serialized name.
pub fn parse_fallback(s: &str) -> CliResult<FallbackPolicy> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(FallbackPolicy::Strict),
        "absent" | "midnight_when_absent" => Ok(FallbackPolicy::MidnightWhenAbsent),
        "error" | "midnight_on_error" => Ok(FallbackPolicy::MidnightOnError),
        _ => Err(CliError::input(format!(
            "Invalid fallback '{}'. Expected: strict, absent, error",
            s
        ))),
    }
}

/// Short name of `policy` as typed on the command line.
pub fn fallback_flag(policy: FallbackPolicy) -> &'static str {
    match policy {
        FallbackPolicy::Strict => "strict",
        FallbackPolicy::MidnightWhenAbsent => "absent",
        FallbackPolicy::MidnightOnError => "error",
    }
}

pub fn parse_date_arg(name: &str, value: &str) -> CliResult<NaiveDate> {
    parse_date(value).map_err(|e| CliError::input(format!("Invalid {} date: {}", name, e)))
}

/// Open `path` for line reading; `-` means stdin.
pub fn open_input(path: &str) -> CliResult<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path)
        .map_err(|e| CliError::runtime(format!("Failed to open file '{}': {}", path, e)))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Non-empty, trimmed lines of `reader`.
pub fn input_lines(reader: Box<dyn BufRead>) -> impl Iterator<Item = CliResult<String>> {
    reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(Ok(line.trim().to_string())),
        Err(e) => Some(Err(CliError::runtime(format!("Failed to read line: {}", e)))),
    })
}

pub fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> CliResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_names() {
        assert_eq!(parse_fallback("strict").unwrap(), FallbackPolicy::Strict);
        assert_eq!(parse_fallback("Absent").unwrap(), FallbackPolicy::MidnightWhenAbsent);
        assert_eq!(parse_fallback("error").unwrap(), FallbackPolicy::MidnightOnError);
        assert!(parse_fallback("lenient").is_err());
    }

    #[test]
    fn fallback_accepts_serialized_names_and_echoes_flags() {
        for name in ["midnight_when_absent", "midnight_on_error"] {
            let policy = parse_fallback(name).unwrap();
            assert_eq!(policy.to_string(), name);
            assert_eq!(parse_fallback(fallback_flag(policy)).unwrap(), policy);
        }
        assert_eq!(fallback_flag(FallbackPolicy::default()), "absent");
    }

    #[test]
    fn location_config_rejects_bad_timezone() {
        let args = LocationArgs {
            tz: "Not/AZone".to_string(),
            close_time: "02:00".to_string(),
        };
        let err = location_config(&args).unwrap_err();
        assert_eq!(err.to_string(), "Invalid timezone: Not/AZone");
    }
}
