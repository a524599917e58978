// mediaconv-cli/src/main.rs
//
// Binary entry point: parses arguments, initializes logging, dispatches to
// the command implementations, and maps results to process exit codes.
//
// Exit codes: the convert command exits with the code of its outcome
// (0 success, 1 tool or launch failure, 124 cancelled); invalid settings and
// bad usage exit 2.

use clap::Parser;
use console::style;
use mediaconv_cli::cli::{Cli, Commands};
use mediaconv_cli::{logging, run_check, run_convert};
use mediaconv_core::{CoreError, outcome_exit_code};
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match cli.command {
        Commands::Convert(args) => match run_convert(args) {
            Ok(outcome) => outcome_exit_code(&outcome),
            Err(e) => report_error(&e),
        },
        Commands::Check(args) => match run_check(args) {
            Ok(()) => 0,
            Err(e) => report_error(&e),
        },
    };

    process::exit(code);
}

fn report_error(error: &CoreError) -> i32 {
    eprintln!("{} {}", style("Error:").red().bold(), error);
    match error {
        CoreError::Validation(_) => 2,
        _ => 1,
    }
}
