use std::process::ExitCode;

use bizday_core::{
    BoundsResult, BusinessDayResolver, InputTimestamp, LocationTimeConfig, TimestampFormat,
    parse_timestamp,
};
use chrono_tz::Tz;

use crate::cli::BoundsArgs;
use crate::error::{CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{input_lines, location_config, open_input, parse_format, print_json};

pub fn run_bounds(
    args: BoundsArgs,
    resolver: &BusinessDayResolver,
    output_format: OutputFormat,
) -> CliResult<ExitCode> {
    let (config, tz) = location_config(&args.location)?;
    let format = parse_format(&args.format)?;

    for line in input_lines(open_input(&args.input)?) {
        let line = line?;
        let result = process_bounds_line(&line, resolver, &config, tz, format)
            .map_err(|e| e.context(format_args!("Error processing '{}'", line)))?;

        match output_format {
            OutputFormat::Json => print_json(&result, false)?,
            OutputFormat::Text => {
                println!(
                    "{} -> {} to {}",
                    result.day.operating_day, result.day.start_local, result.day.end_local
                );
            }
        }
    }

    tracing::debug!(cache = ?resolver.cache_stats(), "bounds finished");
    Ok(ExitCode::from(EXIT_SUCCESS))
}

fn process_bounds_line(
    input: &str,
    resolver: &BusinessDayResolver,
    config: &LocationTimeConfig,
    tz: Tz,
    format: TimestampFormat,
) -> CliResult<BoundsResult> {
    let instant = parse_timestamp(input, format)?;
    let day = resolver.operating_day_for(instant, config)?;

    Ok(BoundsResult {
        input: InputTimestamp {
            ts: input.to_string(),
            epoch_ms: instant.timestamp_millis(),
        },
        tz: config.timezone.clone(),
        close_time: config.business_close_time.clone(),
        day: day.report(tz),
    })
}
