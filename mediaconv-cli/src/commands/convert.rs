//! Implementation of the 'convert' subcommand.
//!
//! This module resolves CLI arguments into conversion settings, hands the
//! built command to the core job supervisor, and presents the job's progress
//! and outcome. The external tool is not checked up front: a missing binary
//! surfaces as a launch-failure outcome, distinct from a tool that ran and
//! failed.

use crate::cli::ConvertArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;

use mediaconv_core::events::json_handler::JsonProgressHandler;
use mediaconv_core::{
    ConversionSettings, CoreError, EventDispatcher, JobHandle, JobSupervisor, Outcome,
    SystemSpawner, build_command, outcome_message,
};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

/// Container format assumed when neither --format nor a usable output
/// extension is given.
const DEFAULT_FORMAT: &str = "mp4";

/// Validates that the input exists and is a file, and resolves it to an
/// absolute path.
fn resolve_input(input: &Path) -> CliResult<PathBuf> {
    let metadata = match fs::metadata(input) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::InputNotFound(input.display().to_string()));
        }
        Err(e) => {
            return Err(e).cli_with_context(|| {
                format!("Failed to access input path '{}'", input.display())
            });
        }
    };

    if metadata.is_dir() {
        return Err(CoreError::InvalidPath(format!(
            "input '{}' is a directory, expected a media file",
            input.display()
        )));
    }

    input
        .canonicalize()
        .cli_with_context(|| format!("Invalid input path '{}'", input.display()))
}

/// Resolves a path against the current directory without requiring it to
/// exist yet.
fn absolutize(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().cli_context("Failed to determine current directory")?;
    Ok(cwd.join(path))
}

/// Picks the output format: explicit flag first, then the output file
/// extension lowercased, then the default container.
fn resolve_format(explicit: Option<&str>, output: &Path) -> String {
    if let Some(format) = explicit {
        return format.to_string();
    }
    output
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string())
}

/// Builds the settings value for this invocation.
fn create_settings(args: &ConvertArgs) -> CliResult<ConversionSettings> {
    let mut settings = ConversionSettings::default();
    settings.input_path = resolve_input(&args.input)?;
    settings.output_path = absolutize(&args.output)?;
    settings.format = resolve_format(args.format.as_deref(), &settings.output_path);

    if let Some(codec) = &args.audio_codec {
        settings.audio.codec = codec.clone();
    }
    if let Some(bitrate) = &args.audio_bitrate {
        settings.audio.bitrate = bitrate.clone();
    }
    if let Some(codec) = &args.video_codec {
        settings.video.codec = codec.clone();
    }
    if let Some(resolution) = &args.resolution {
        settings.video.resolution = resolution.clone();
    }

    Ok(settings)
}

/// Runs one conversion to completion and returns its outcome.
pub fn run_convert(args: ConvertArgs) -> CliResult<Outcome> {
    let settings = create_settings(&args)?;
    let spec = build_command(&settings)?;
    debug!("Built tool invocation: {} {}", args.tool.display(), spec);

    if !args.json {
        terminal::print_section("CONVERSION");
        terminal::print_status("Input", &settings.input_path.display().to_string());
        terminal::print_status("Output", &settings.output_path.display().to_string());
        terminal::print_status("Format", &settings.format);
        terminal::print_status("Tool", &args.tool.display().to_string());
        terminal::print_processing("Starting conversion");
    }

    let mut dispatcher = EventDispatcher::new();
    if args.json {
        dispatcher.add_handler(Arc::new(JsonProgressHandler::new()));
    } else {
        dispatcher.add_handler(Arc::new(terminal::ChunkPrinter));
    }

    let supervisor = JobSupervisor::with_dispatcher(SystemSpawner::new(&args.tool), dispatcher);
    let handle = supervisor.start(spec);

    let outcome = match args.timeout {
        Some(secs) => match handle.wait_timeout(Duration::from_secs(secs)) {
            Some(outcome) => outcome,
            None => {
                warn!("Conversion still running after {secs}s, cancelling");
                handle.cancel();
                handle.wait()
            }
        },
        None => handle.wait(),
    };

    report_outcome(&handle, &outcome, &args);
    Ok(outcome)
}

/// Presents the terminal state of the job, styled or as a JSON line.
fn report_outcome(handle: &JobHandle, outcome: &Outcome, args: &ConvertArgs) {
    let message = outcome_message(outcome);

    if args.json {
        let result = serde_json::json!({
            "type": "result",
            "outcome": outcome,
            "message": message,
            "finished_at": chrono::Local::now().to_rfc3339(),
        });
        if let Ok(line) = serde_json::to_string(&result) {
            println!("{line}");
        }
        return;
    }

    // The progress stream may have ended mid-line.
    println!();
    match outcome {
        Outcome::Success => terminal::print_success(&message),
        Outcome::ToolFailure { .. } => {
            terminal::print_error(&message, None);
            let diagnostics = handle.diagnostics();
            if !diagnostics.is_empty() {
                eprintln!("Tool stderr (tail):");
                for line in diagnostics.lines() {
                    eprintln!("  {line}");
                }
            }
        }
        Outcome::SpawnFailure { .. } => {
            terminal::print_error(
                &message,
                Some(&format!(
                    "Check that '{}' is installed, or point --tool at another binary",
                    args.tool.display()
                )),
            );
        }
        Outcome::Cancelled => terminal::print_warning(&message),
    }
}
