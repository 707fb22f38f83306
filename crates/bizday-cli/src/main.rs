use std::process::ExitCode;

use clap::Parser;

mod bounds_cmd;
mod cli;
mod collapse_cmd;
mod error;
mod find_cmd;
mod range_cmd;
mod shared;
mod today_cmd;

use bounds_cmd::run_bounds;
use cli::{Cli, Commands};
use collapse_cmd::run_collapse;
use error::{CliResult, OutputFormat, output_format_hint, parse_output_format, render_error};
use find_cmd::run_find;
use range_cmd::run_range;
use shared::build_resolver;
use today_cmd::run_today;

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse the output format, then run the command, rendering any error in
/// the requested format.
fn dispatch<F>(output_format: &str, run: F) -> ExitCode
where
    F: FnOnce(OutputFormat) -> CliResult<ExitCode>,
{
    let fallback = output_format_hint(output_format);
    let output_format = match parse_output_format(output_format) {
        Ok(format) => format,
        Err(err) => return render_error(&err, fallback),
    };

    match run(output_format) {
        Ok(code) => code,
        Err(err) => render_error(&err, output_format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    tracing::debug!("Parsed CLI args: {:?}", cli);

    let resolver = build_resolver(&cli.global);

    match cli.command {
        Commands::Bounds(args) => {
            let format = args.output_format.clone();
            dispatch(&format, |out| run_bounds(args, &resolver, out))
        }
        Commands::Today(args) => {
            let format = args.output_format.clone();
            dispatch(&format, |out| run_today(args, &resolver, out))
        }
        Commands::Range(args) => {
            let format = args.output_format.clone();
            dispatch(&format, |out| run_range(args, &resolver, out))
        }
        Commands::Collapse(args) => {
            let format = args.output_format.clone();
            dispatch(&format, |out| run_collapse(args, &resolver, out))
        }
        Commands::Find(args) => {
            let format = args.output_format.clone();
            dispatch(&format, |out| run_find(args, &resolver, out))
        }
    }
}
