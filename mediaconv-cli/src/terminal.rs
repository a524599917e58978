// mediaconv-cli/src/terminal.rs
//
// Terminal output styling for the CLI. User-facing status lines are styled
// with the console crate; the raw tool progress stream is passed through
// untouched by the ChunkPrinter handler.

use console::style;
use mediaconv_core::{Event, EventHandler};
use std::io::{self, Write};

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const PROCESSING_SYMBOL: &str = "»";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
}

/// Prints a section header.
pub fn print_section(title: &str) {
    println!(
        "{}",
        style(format!(
            "{}{}{}",
            styling::SECTION_PREFIX,
            title,
            styling::SECTION_SUFFIX
        ))
        .cyan()
        .bold()
    );
}

/// Prints an indented label/value status line.
pub fn print_status(label: &str, value: &str) {
    println!(
        "{}{} {}",
        styling::STATUS_INDENT,
        style(format!("{label}:")).bold(),
        value
    );
}

/// Prints a processing step line.
pub fn print_processing(message: &str) {
    println!("{} {}", style(styling::PROCESSING_SYMBOL).bold(), message);
}

/// Prints a success line.
pub fn print_success(message: &str) {
    println!(
        "{} {}",
        style(styling::SUCCESS_SYMBOL).green().bold(),
        style(message).green()
    );
}

/// Prints a cautionary line.
pub fn print_warning(message: &str) {
    println!("{}", style(message).yellow());
}

/// Prints an error with an optional suggestion, to stderr.
pub fn print_error(message: &str, suggestion: Option<&str>) {
    eprintln!(
        "{} {}",
        style(styling::ERROR_SYMBOL).red().bold(),
        style(message).red()
    );
    if let Some(suggestion) = suggestion {
        eprintln!("{}{}", styling::STATUS_INDENT, style(suggestion).dim());
    }
}

/// Event handler that forwards raw progress chunks straight to stdout.
///
/// Chunks are written exactly as the tool produced them, with a flush per
/// chunk so partial lines (carriage-return progress updates, percentages)
/// appear as they happen.
pub struct ChunkPrinter;

impl EventHandler for ChunkPrinter {
    fn handle(&self, event: &Event) {
        if let Event::ProgressChunk { chunk } = event {
            let mut stdout = io::stdout();
            let _ = write!(stdout, "{chunk}");
            let _ = stdout.flush();
        }
    }
}
