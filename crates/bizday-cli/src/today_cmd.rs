use std::process::ExitCode;

use bizday_core::{BusinessDayResolver, Clock};

use crate::cli::TodayArgs;
use crate::error::{CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{location_config, print_json};

pub fn run_today(
    args: TodayArgs,
    resolver: &BusinessDayResolver,
    output_format: OutputFormat,
) -> CliResult<ExitCode> {
    let (config, tz) = location_config(&args.location)?;

    let bounds = if args.yesterday {
        resolver.resolve_bounds_for_yesterday(&config)?
    } else {
        resolver.resolve_bounds_for_today(&config)?
    };
    let date = resolver.find_operating_day(&bounds.start, &config)?;
    let report = bizday_core::OperatingDay { date, bounds }.report(tz);

    tracing::debug!(now = %resolver.clock().now(), yesterday = args.yesterday, "resolved current day");

    match output_format {
        OutputFormat::Json => print_json(&report, true)?,
        OutputFormat::Text => {
            println!(
                "{}: {} to {}",
                report.operating_day, report.start_local, report.end_local
            );
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
