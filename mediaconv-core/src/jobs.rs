//! Asynchronous supervision of conversion jobs.
//!
//! [`JobSupervisor::start`] launches the external tool and returns a
//! [`JobHandle`] immediately; a worker thread owns the process for the whole
//! run. The worker pumps stdout into the job's [`ProgressSink`] chunk by
//! chunk, keeps a bounded tail of stderr for diagnostics, and resolves the
//! job to exactly one [`Outcome`]. The outcome is published strictly after
//! the last stdout chunk has reached the sink.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::command::CommandSpec;
use crate::events::{Event, EventDispatcher};
use crate::external::{ToolProcess, ToolSpawner};
use crate::progress::ProgressSink;

/// How often the worker checks the process for completion or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stdout is read in chunks of up to this many bytes.
const READ_BUF_SIZE: usize = 8 * 1024;

/// Number of trailing stderr lines retained for diagnostics.
const DIAGNOSTIC_TAIL_LINES: usize = 40;

// --- Outcome ---

/// Terminal state of a conversion job. Every job resolves to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The tool ran to completion and exited zero.
    Success,
    /// The tool ran but exited nonzero, or died without an exit code.
    ToolFailure { code: Option<i32> },
    /// The tool could not be launched at all.
    SpawnFailure { reason: String },
    /// The job was cancelled before the tool finished on its own.
    Cancelled,
}

// --- Job State and Handle ---

#[derive(Debug)]
struct JobState {
    sink: ProgressSink,
    outcome: Mutex<Option<Outcome>>,
    done: Condvar,
    cancel_requested: AtomicBool,
    diagnostics: Mutex<VecDeque<String>>,
}

impl JobState {
    fn new() -> Self {
        Self {
            sink: ProgressSink::new(),
            outcome: Mutex::new(None),
            done: Condvar::new(),
            cancel_requested: AtomicBool::new(false),
            diagnostics: Mutex::new(VecDeque::new()),
        }
    }

    fn push_diagnostic(&self, line: String) {
        let mut tail = self.diagnostics.lock().unwrap();
        tail.push_back(line);
        while tail.len() > DIAGNOSTIC_TAIL_LINES {
            tail.pop_front();
        }
    }

    fn finish(&self, outcome: Outcome) {
        let mut slot = self.outcome.lock().unwrap();
        if slot.is_none() {
            *slot = Some(outcome);
        }
        self.done.notify_all();
    }
}

/// Observer handle for one running or finished job.
///
/// The handle never owns the process. Progress is readable at any time while
/// the job runs; [`JobHandle::outcome`] stays `None` until the job reaches a
/// terminal state.
#[derive(Debug)]
pub struct JobHandle {
    state: Arc<JobState>,
}

impl JobHandle {
    /// Everything the tool has written to stdout so far.
    pub fn progress(&self) -> String {
        self.state.sink.snapshot()
    }

    /// The underlying sink, for incremental readers.
    pub fn sink(&self) -> &ProgressSink {
        &self.state.sink
    }

    /// The retained tail of the tool's stderr, newline-joined.
    pub fn diagnostics(&self) -> String {
        let tail = self.state.diagnostics.lock().unwrap();
        tail.iter().cloned().collect::<Vec<_>>().join("\n")
    }

    /// The terminal outcome, or `None` while the job is still running.
    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome.lock().unwrap().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    /// Blocks until the job resolves and returns its outcome.
    pub fn wait(&self) -> Outcome {
        let guard = self.state.outcome.lock().unwrap();
        let guard = self
            .state
            .done
            .wait_while(guard, |outcome| outcome.is_none())
            .unwrap();
        guard.clone().unwrap()
    }

    /// Like [`JobHandle::wait`] but gives up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome> {
        let guard = self.state.outcome.lock().unwrap();
        let (guard, _) = self
            .state
            .done
            .wait_timeout_while(guard, timeout, |outcome| outcome.is_none())
            .unwrap();
        guard.clone()
    }

    /// Requests cancellation of the job.
    ///
    /// Idempotent, and harmless after the job has already resolved: a
    /// finished outcome is never rewritten. A job stopped by cancellation
    /// resolves to [`Outcome::Cancelled`] even though the killed tool exits
    /// abnormally.
    pub fn cancel(&self) {
        self.state.cancel_requested.store(true, Ordering::SeqCst);
    }
}

// --- Supervisor ---

/// Launches jobs against a spawner and hands out observer handles.
pub struct JobSupervisor<S> {
    spawner: Arc<S>,
    dispatcher: Arc<EventDispatcher>,
}

impl<S> JobSupervisor<S>
where
    S: ToolSpawner + 'static,
{
    pub fn new(spawner: S) -> Self {
        Self::with_dispatcher(spawner, EventDispatcher::new())
    }

    pub fn with_dispatcher(spawner: S, dispatcher: EventDispatcher) -> Self {
        Self {
            spawner: Arc::new(spawner),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Starts a job for the given command and returns without blocking.
    ///
    /// Each call owns one process handle for its whole lifetime; concurrent
    /// jobs are fully independent.
    pub fn start(&self, spec: CommandSpec) -> JobHandle {
        let state = Arc::new(JobState::new());
        let worker_state = Arc::clone(&state);
        let spawner = Arc::clone(&self.spawner);
        let dispatcher = Arc::clone(&self.dispatcher);

        thread::spawn(move || {
            run_job(spawner.as_ref(), &dispatcher, &spec, &worker_state);
        });

        JobHandle { state }
    }
}

// --- Worker ---

fn run_job<S: ToolSpawner>(
    spawner: &S,
    dispatcher: &Arc<EventDispatcher>,
    spec: &CommandSpec,
    state: &Arc<JobState>,
) {
    dispatcher.emit(Event::JobStarted {
        args: spec.args().to_vec(),
    });

    let mut process = match spawner.spawn(spec) {
        Ok(process) => process,
        Err(e) => {
            log::error!("Failed to start conversion tool: {e}");
            let outcome = Outcome::SpawnFailure {
                reason: e.to_string(),
            };
            dispatcher.emit(Event::JobFinished {
                outcome: outcome.clone(),
            });
            state.finish(outcome);
            return;
        }
    };

    let stdout_pump = process.take_stdout().map(|stdout| {
        let state = Arc::clone(state);
        let dispatcher = Arc::clone(dispatcher);
        thread::spawn(move || pump_stdout(stdout, &state, &dispatcher))
    });

    let stderr_pump = process.take_stderr().map(|stderr| {
        let state = Arc::clone(state);
        thread::spawn(move || pump_stderr(stderr, &state))
    });

    // Poll for completion, killing the process once if cancellation arrives.
    let mut kill_sent = false;
    let wait_result = loop {
        if state.cancel_requested.load(Ordering::SeqCst) && !kill_sent {
            log::debug!("Cancellation requested, killing the tool process");
            if let Err(e) = process.kill() {
                log::warn!("Failed to kill the tool process: {e}");
            }
            kill_sent = true;
        }

        match process.try_wait() {
            Ok(Some(status)) => break Ok(status),
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => break Err(e),
        }
    };

    // Drain both pipes before resolving so the outcome lands strictly after
    // the last progress chunk.
    if let Some(handle) = stdout_pump {
        let _ = handle.join();
    }
    if let Some(handle) = stderr_pump {
        let _ = handle.join();
    }

    let cancelled = state.cancel_requested.load(Ordering::SeqCst);
    let outcome = match wait_result {
        _ if cancelled => Outcome::Cancelled,
        Ok(status) if status.success() => Outcome::Success,
        Ok(status) => {
            log::warn!(
                "Conversion tool exited with code {}",
                status
                    .code()
                    .map_or_else(|| "none".to_string(), |c| c.to_string())
            );
            Outcome::ToolFailure {
                code: status.code(),
            }
        }
        Err(e) => {
            log::error!("Error waiting for the tool process: {e}");
            state.push_diagnostic(format!("wait error: {e}"));
            Outcome::ToolFailure { code: None }
        }
    };

    // Handlers see the finished event before wait() can observe the outcome.
    dispatcher.emit(Event::JobFinished {
        outcome: outcome.clone(),
    });
    state.finish(outcome);
}

/// Forwards raw stdout chunks to the sink and the dispatcher, in order.
fn pump_stdout(
    mut stdout: Box<dyn Read + Send>,
    state: &Arc<JobState>,
    dispatcher: &Arc<EventDispatcher>,
) {
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        match stdout.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                state.sink.append(&chunk);
                dispatcher.emit(Event::ProgressChunk { chunk });
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("Error reading tool stdout: {e}");
                break;
            }
        }
    }
}

/// Collects stderr lines into the bounded diagnostic tail.
fn pump_stderr(stderr: Box<dyn Read + Send>, state: &Arc<JobState>) {
    let reader = BufReader::new(stderr);
    #[allow(clippy::manual_flatten)]
    for line_result in reader.lines() {
        if let Ok(line) = line_result {
            log::debug!("STDERR: {}", line);
            state.push_diagnostic(line);
        }
    }
}
