use std::process::ExitCode;

use bizday_core::tz::format_rfc3339_utc_millis;
use bizday_core::{BoundsSource, BusinessDayResolver, LocationSettings, query_bounds};
use serde::Serialize;

use crate::cli::CollapseArgs;
use crate::error::{CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{fallback_flag, parse_date_arg, parse_fallback, print_json};

#[derive(Debug, Serialize)]
struct CollapseResult {
    start_utc: String,
    end_utc: String,
    source: BoundsSource,
    fallback: &'static str,
}

pub fn run_collapse(
    args: CollapseArgs,
    resolver: &BusinessDayResolver,
    output_format: OutputFormat,
) -> CliResult<ExitCode> {
    let policy = parse_fallback(&args.fallback)?;
    let start = parse_date_arg("start", &args.start)?;
    let end = parse_date_arg("end", &args.end)?;
    let settings = LocationSettings::new(args.close_time.as_deref(), args.tz.as_deref());

    let query = query_bounds(resolver, start, end, &settings, policy)?;
    let result = CollapseResult {
        start_utc: format_rfc3339_utc_millis(&query.bounds.start),
        end_utc: format_rfc3339_utc_millis(&query.bounds.end),
        source: query.source,
        fallback: fallback_flag(policy),
    };

    match output_format {
        OutputFormat::Json => print_json(&result, true)?,
        OutputFormat::Text => {
            println!("{} to {} ({:?})", result.start_utc, result.end_utc, result.source);
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
