// mediaconv-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Mediaconv: media conversion job orchestrator",
    long_about = "Drives an external transcoding tool (ffmpeg by default) as a supervised \
                  subprocess, streaming its progress and reporting a distinct outcome for \
                  success, tool failure, launch failure, and cancellation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts one media file by running the external tool
    Convert(ConvertArgs),
    /// Verifies that the external tool is installed and runnable
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Source media file
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT_FILE")]
    pub input: PathBuf,

    /// Destination file for the converted media
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_FILE")]
    pub output: PathBuf,

    /// Output container format (defaults to the output file extension, then mp4)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<String>,

    // --- Codec Overrides ---
    /// Audio codec for audio targets
    #[arg(long, value_name = "CODEC")]
    pub audio_codec: Option<String>,

    /// Audio bitrate for audio targets (e.g. 192k)
    #[arg(long, value_name = "BITRATE")]
    pub audio_bitrate: Option<String>,

    /// Video codec for video targets
    #[arg(long, value_name = "CODEC")]
    pub video_codec: Option<String>,

    /// Output resolution for video targets (e.g. 1280x720)
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub resolution: Option<String>,

    // --- Execution ---
    /// External tool binary to drive.
    /// Can also be set via the MEDIACONV_TOOL environment variable.
    #[arg(long, value_name = "PROGRAM", default_value = "ffmpeg", env = "MEDIACONV_TOOL")]
    pub tool: PathBuf,

    /// Cancel the conversion if it runs longer than this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Emit machine-readable JSON lines instead of styled output
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// External tool binary to look for.
    /// Can also be set via the MEDIACONV_TOOL environment variable.
    #[arg(long, value_name = "PROGRAM", default_value = "ffmpeg", env = "MEDIACONV_TOOL")]
    pub tool: PathBuf,
}
