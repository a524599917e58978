//! Spawning and supervising the external conversion tool.
//!
//! The tool is an ordinary subprocess (ffmpeg or compatible) invoked with
//! discrete arguments; nothing here goes through a shell. The spawner trait
//! is the seam between the job supervisor and the operating system, and the
//! mock implementations behind the `test-mocks` feature slot in there for
//! tests.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::command::CommandSpec;
use crate::error::{CoreError, CoreResult, command_start_error};

#[cfg(feature = "test-mocks")]
pub mod mocks;

// --- Process Abstraction ---

/// A running instance of the external tool.
///
/// The supervisor takes the pipes once, polls for completion, and kills the
/// process on cancellation. Implementations must hand out each pipe at most
/// once.
pub trait ToolProcess: Send {
    /// Takes the stdout pipe. Returns `None` once taken.
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>>;

    /// Takes the stderr pipe. Returns `None` once taken.
    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>>;

    /// Checks for completion without blocking.
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>>;

    /// Requests termination. Safe to call on an already-exited process.
    fn kill(&mut self) -> io::Result<()>;
}

/// Something that can launch the external tool for a built command.
pub trait ToolSpawner: Send + Sync {
    type Child: ToolProcess + 'static;

    /// Launches the tool with the built arguments, pipes attached.
    fn spawn(&self, spec: &CommandSpec) -> CoreResult<Self::Child>;
}

// --- System Implementation ---

/// Spawns the real tool binary via `std::process::Command`.
#[derive(Debug, Clone)]
pub struct SystemSpawner {
    program: PathBuf,
}

impl SystemSpawner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ToolSpawner for SystemSpawner {
    type Child = SystemProcess;

    fn spawn(&self, spec: &CommandSpec) -> CoreResult<Self::Child> {
        log::debug!("Spawning {} {}", self.program.display(), spec);

        let child = Command::new(&self.program)
            .args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error(&self.program.to_string_lossy(), e))?;

        log::debug!("Spawned pid {}", child.id());
        Ok(SystemProcess { child })
    }
}

/// A real child process with piped stdout/stderr.
pub struct SystemProcess {
    child: Child,
}

impl ToolProcess for SystemProcess {
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn Read + Send>)
    }

    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn Read + Send>)
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.kill()
    }
}

// --- Dependency Checking ---

/// Checks that the external tool is present and executable.
///
/// Runs the program with a `-version` argument and discards its output. A
/// missing binary maps to [`CoreError::DependencyNotFound`]; any other launch
/// failure maps to a start error carrying the OS detail.
pub fn check_dependency(program: &Path) -> CoreResult<()> {
    let result = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", program.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found", program.display());
            Err(CoreError::DependencyNotFound(
                program.to_string_lossy().into_owned(),
            ))
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check for '{}': {}",
                program.display(),
                e
            );
            Err(command_start_error(&program.to_string_lossy(), e))
        }
    }
}
