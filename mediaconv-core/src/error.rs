use std::path::PathBuf;
use thiserror::Error;

/// Settings problems caught by the command builder before anything is spawned.
///
/// These are always recoverable: the caller can fix the offending field and
/// build again. No side effects have occurred when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("input path is empty")]
    EmptyInputPath,

    #[error("output path is empty")]
    EmptyOutputPath,

    #[error("output format is empty")]
    EmptyFormat,

    #[error("input and output refer to the same path: {0}")]
    SamePath(PathBuf),
}

/// Custom error types for mediaconv
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid conversion settings: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to start {tool}: {source}")]
    CommandStart {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("required external tool not found: {0}")]
    DependencyNotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("input file not found: {0}")]
    InputNotFound(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for mediaconv operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for a tool that could not be spawned.
pub fn command_start_error(tool: &str, source: std::io::Error) -> CoreError {
    CoreError::CommandStart {
        tool: tool.to_string(),
        source,
    }
}
