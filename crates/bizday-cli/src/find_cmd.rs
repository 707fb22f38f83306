use std::process::ExitCode;

use bizday_core::{BusinessDayResolver, parse_timestamp};
use serde::Serialize;

use crate::cli::FindArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{
    input_lines, location_config, open_input, parse_date_arg, parse_format, print_json,
};

#[derive(Debug, Serialize)]
struct FindResult {
    ts: String,
    operating_day: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_day: Option<bool>,
}

pub fn run_find(
    args: FindArgs,
    resolver: &BusinessDayResolver,
    output_format: OutputFormat,
) -> CliResult<ExitCode> {
    let (config, _) = location_config(&args.location)?;
    let format = parse_format(&args.format)?;
    let day = args
        .day
        .as_deref()
        .map(|d| parse_date_arg("day", d))
        .transpose()?;

    for line in input_lines(open_input(&args.input)?) {
        let line = line?;
        let instant = parse_timestamp(&line, format)
            .map_err(|e| CliError::from(e).context(format_args!("Error processing '{}'", line)))?;

        let operating_day = resolver.find_operating_day(&instant, &config)?;
        let in_day = day
            .map(|d| resolver.is_timestamp_in_operating_day(&instant, d, &config))
            .transpose()?;

        let result = FindResult {
            ts: line,
            operating_day: operating_day.format("%Y-%m-%d").to_string(),
            in_day,
        };

        match output_format {
            OutputFormat::Json => print_json(&result, false)?,
            OutputFormat::Text => match result.in_day {
                Some(inside) => println!("{} -> {} ({})", result.ts, result.operating_day, inside),
                None => println!("{} -> {}", result.ts, result.operating_day),
            },
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
