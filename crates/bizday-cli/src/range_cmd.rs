use std::process::ExitCode;

use bizday_core::{BusinessDayResolver, OperatingDayReport};

use crate::cli::RangeArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{location_config, parse_date_arg, print_json};

pub fn run_range(
    args: RangeArgs,
    resolver: &BusinessDayResolver,
    output_format: OutputFormat,
) -> CliResult<ExitCode> {
    let (config, tz) = location_config(&args.location)?;
    let start = parse_date_arg("start", &args.start)?;
    let end = parse_date_arg("end", &args.end)?;

    if end < start {
        return Err(CliError::input(format!(
            "Invalid range: start '{}' must not be later than end '{}'",
            args.start, args.end
        )));
    }

    let days: Vec<OperatingDayReport> = resolver
        .resolve_date_range(start, end, &config)?
        .iter()
        .map(|day| day.report(tz))
        .collect();

    match output_format {
        OutputFormat::Json => print_json(&days, true)?,
        OutputFormat::Text => {
            for day in days {
                println!("{}: {} to {}", day.operating_day, day.start_local, day.end_local);
            }
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
