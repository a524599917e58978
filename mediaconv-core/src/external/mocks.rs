// --- Mocking Infrastructure (for testing) ---

// This module is only compiled when the "test-mocks" feature is enabled.
#![cfg(feature = "test-mocks")]

use super::*;
use crate::command::CommandSpec;
use crate::error::{CoreError, CoreResult};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};

/// How a scripted mock process ends.
#[derive(Debug, Clone, Copy)]
pub enum MockExit {
    /// Normal exit with this code.
    Code(i32),
    /// Killed by this signal, so no exit code is reported.
    Signal(i32),
    /// Reaping the process fails with an I/O error.
    WaitError,
}

/// Scripted behavior for one mock process.
#[derive(Debug, Clone)]
pub struct MockScript {
    /// Chunks served from stdout, one per read call.
    pub stdout_chunks: Vec<String>,
    /// Lines served from stderr.
    pub stderr_lines: Vec<String>,
    /// Exit status reported once the chunks are drained.
    pub exit: MockExit,
    /// When set, the process stays alive after its chunks until killed.
    pub hold_until_kill: bool,
}

/// Represents an expected tool invocation and its mock result.
pub struct MockExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockScript>,
}

/// Mock implementation of `ToolSpawner` supporting multiple expectations.
///
/// Expectations are matched by substring against the invocation's arguments,
/// so concurrently started jobs with distinct paths resolve deterministically.
#[derive(Clone, Default)]
pub struct MockSpawner {
    expectations: Arc<Mutex<Vec<MockExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(&self, arg_pattern: &str, result: CoreResult<MockScript>) {
        self.expectations.lock().unwrap().push(MockExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
        });
    }

    /// Process that emits the chunks and exits zero.
    pub fn add_success_expectation(&self, arg_pattern: &str, stdout_chunks: Vec<&str>) {
        self.add_expectation(
            arg_pattern,
            Ok(MockScript {
                stdout_chunks: stdout_chunks.iter().map(|c| c.to_string()).collect(),
                stderr_lines: Vec::new(),
                exit: MockExit::Code(0),
                hold_until_kill: false,
            }),
        );
    }

    /// Process that emits the chunks and exits with a nonzero code.
    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        stdout_chunks: Vec<&str>,
        stderr_lines: Vec<&str>,
        exit_code: i32,
    ) {
        self.add_expectation(
            arg_pattern,
            Ok(MockScript {
                stdout_chunks: stdout_chunks.iter().map(|c| c.to_string()).collect(),
                stderr_lines: stderr_lines.iter().map(|l| l.to_string()).collect(),
                exit: MockExit::Code(exit_code),
                hold_until_kill: false,
            }),
        );
    }

    /// Process that dies to a signal before producing an exit code.
    pub fn add_signal_exit_expectation(&self, arg_pattern: &str, signal: i32) {
        self.add_expectation(
            arg_pattern,
            Ok(MockScript {
                stdout_chunks: Vec::new(),
                stderr_lines: Vec::new(),
                exit: MockExit::Signal(signal),
                hold_until_kill: false,
            }),
        );
    }

    /// Process that emits the chunks and then runs until it is killed.
    pub fn add_hold_until_kill_expectation(&self, arg_pattern: &str, stdout_chunks: Vec<&str>) {
        self.add_expectation(
            arg_pattern,
            Ok(MockScript {
                stdout_chunks: stdout_chunks.iter().map(|c| c.to_string()).collect(),
                stderr_lines: Vec::new(),
                exit: MockExit::Code(0),
                hold_until_kill: true,
            }),
        );
    }

    /// Process that runs but whose exit status cannot be read back.
    pub fn add_wait_error_expectation(&self, arg_pattern: &str, stdout_chunks: Vec<&str>) {
        self.add_expectation(
            arg_pattern,
            Ok(MockScript {
                stdout_chunks: stdout_chunks.iter().map(|c| c.to_string()).collect(),
                stderr_lines: Vec::new(),
                exit: MockExit::WaitError,
                hold_until_kill: false,
            }),
        );
    }

    /// Invocation that fails to launch at all.
    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error));
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }
}

impl ToolSpawner for MockSpawner {
    type Child = MockProcess;

    fn spawn(&self, spec: &CommandSpec) -> CoreResult<Self::Child> {
        let args: Vec<String> = spec.args().to_vec();
        self.received_calls.lock().unwrap().push(args.clone());

        let mut expectations = self.expectations.lock().unwrap();

        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        if let Some(index) = found_index {
            let expectation = expectations.remove(index);
            log::info!(
                "MockSpawner: matched expectation with pattern '{}'",
                expectation.arg_pattern
            );
            match expectation.result {
                Ok(script) => Ok(MockProcess::new(script)),
                Err(err) => {
                    log::warn!(
                        "MockSpawner simulating spawn error for pattern '{}': {:?}",
                        expectation.arg_pattern,
                        err
                    );
                    Err(err)
                }
            }
        } else {
            panic!("MockSpawner: no expectation found for command args: {args:?}");
        }
    }
}

/// Serves scripted chunks, one per read call, then reports end of stream.
struct ScriptedReader {
    chunks: VecDeque<Vec<u8>>,
    pending: Vec<u8>,
}

impl ScriptedReader {
    fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            pending: Vec::new(),
        }
    }
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pending.is_empty() {
            match self.chunks.pop_front() {
                Some(chunk) => self.pending = chunk,
                None => return Ok(0),
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

/// Mock implementation of `ToolProcess` driven by a [`MockScript`].
pub struct MockProcess {
    stdout: Option<Box<dyn Read + Send>>,
    stderr: Option<Box<dyn Read + Send>>,
    exit: MockExit,
    hold_until_kill: bool,
    killed: bool,
}

impl MockProcess {
    fn new(script: MockScript) -> Self {
        let stdout = ScriptedReader::new(script.stdout_chunks.iter().map(|c| c.as_bytes().to_vec()));
        let mut stderr_bytes = Vec::new();
        for line in &script.stderr_lines {
            stderr_bytes.extend_from_slice(line.as_bytes());
            stderr_bytes.push(b'\n');
        }
        let stderr = ScriptedReader::new([stderr_bytes]);
        Self {
            stdout: Some(Box::new(stdout)),
            stderr: Some(Box::new(stderr)),
            exit: script.exit,
            hold_until_kill: script.hold_until_kill,
            killed: false,
        }
    }

    fn exit_status(&self) -> io::Result<ExitStatus> {
        if self.killed {
            // Raw wait status for a SIGKILL death.
            return Ok(ExitStatus::from_raw(9));
        }
        match self.exit {
            MockExit::Code(code) => Ok(ExitStatus::from_raw(code << 8)),
            MockExit::Signal(signal) => Ok(ExitStatus::from_raw(signal)),
            MockExit::WaitError => Err(io::Error::other("simulated wait failure")),
        }
    }
}

impl ToolProcess for MockProcess {
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stdout.take()
    }

    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stderr.take()
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        if self.hold_until_kill && !self.killed {
            return Ok(None);
        }
        self.exit_status().map(Some)
    }

    fn kill(&mut self) -> io::Result<()> {
        self.killed = true;
        Ok(())
    }
}
