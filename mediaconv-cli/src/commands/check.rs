//! Implementation of the 'check' subcommand.
//!
//! Verifies that the external conversion tool can actually be launched, so
//! problems with a missing or broken installation show up before any real
//! conversion is attempted.

use crate::cli::CheckArgs;
use crate::error::CliResult;
use crate::terminal;

use mediaconv_core::check_dependency;

/// Runs the configured tool binary once and reports the result.
pub fn run_check(args: CheckArgs) -> CliResult<()> {
    terminal::print_processing(&format!("Checking for '{}'", args.tool.display()));

    match check_dependency(&args.tool) {
        Ok(()) => {
            terminal::print_success(&format!("Found '{}'", args.tool.display()));
            Ok(())
        }
        Err(e) => {
            terminal::print_error(
                &format!("'{}' is not usable", args.tool.display()),
                Some("Install it or point --tool at another binary"),
            );
            Err(e)
        }
    }
}
