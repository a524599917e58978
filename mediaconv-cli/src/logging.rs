// mediaconv-cli/src/logging.rs
//
// Logging setup for the CLI. Diagnostics go through the standard `log`
// macros with `env_logger` as the backend; user-facing output goes through
// the terminal module instead.
//
// The RUST_LOG environment variable overrides the defaults:
// - RUST_LOG=debug: detailed supervision tracing
// - RUST_LOG=trace: very verbose debugging information

/// Initializes env_logger, defaulting to info (or debug with `--verbose`).
///
/// Log lines go to stderr so they never interleave with the progress stream
/// on stdout.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}
