// mediaconv-core/tests/supervisor_tests.rs
//
// Supervision scenarios driven entirely by the scripted mock spawner.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use mediaconv_core::error::command_start_error;
use mediaconv_core::events::{Event, EventDispatcher, EventHandler};
use mediaconv_core::external::mocks::MockSpawner;
use mediaconv_core::{CommandSpec, JobSupervisor, Outcome};

/// Generous bound for mock-driven jobs; they normally resolve in well under a second.
const WAIT_BUDGET: Duration = Duration::from_secs(5);

fn spec_for(path: &str) -> CommandSpec {
    CommandSpec::from_tokens(["-i", path, "-f", "mp4", "/out.mp4"])
}

fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + WAIT_BUDGET;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn successful_run_collects_chunks_in_order() {
    let spawner = MockSpawner::new();
    spawner.add_success_expectation("/in.mov", vec!["10%", "55%", "100%"]);

    let supervisor = JobSupervisor::new(spawner.clone());
    let spec = spec_for("/in.mov");
    let handle = supervisor.start(spec.clone());

    let outcome = handle.wait_timeout(WAIT_BUDGET).expect("job should resolve");
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(handle.progress(), "10%55%100%");

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 1, "expected exactly one spawn");
    assert_eq!(calls[0], spec.args(), "tool must receive the built args verbatim");
}

#[test]
fn nonzero_exit_resolves_to_tool_failure_with_the_code() {
    let spawner = MockSpawner::new();
    spawner.add_exit_error_expectation("/bad.mov", vec!["working"], vec!["codec not found"], 1);

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/bad.mov"));

    let outcome = handle.wait_timeout(WAIT_BUDGET).expect("job should resolve");
    assert_eq!(outcome, Outcome::ToolFailure { code: Some(1) });
    assert_ne!(outcome, Outcome::Success);
    assert_eq!(handle.progress(), "working", "partial output is still captured");
}

#[test]
fn spawn_failure_is_not_a_tool_failure() {
    let spawner = MockSpawner::new();
    spawner.add_spawn_error_expectation(
        "/ghost.mov",
        command_start_error(
            "ffmpeg",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        ),
    );

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/ghost.mov"));

    let outcome = handle.wait_timeout(WAIT_BUDGET).expect("job should resolve");
    match outcome {
        Outcome::SpawnFailure { reason } => {
            assert!(
                reason.contains("No such file or directory"),
                "reason should carry the launch error, got: {reason}"
            );
        }
        other => panic!("expected SpawnFailure, got {other:?}"),
    }
    assert!(!matches!(handle.outcome(), Some(Outcome::ToolFailure { .. })));
    assert_eq!(handle.progress(), "", "nothing ran, so nothing was captured");
}

#[test]
fn cancelled_job_resolves_to_cancelled_despite_the_kill_signal() {
    let spawner = MockSpawner::new();
    spawner.add_hold_until_kill_expectation("/long.mov", vec!["25%"]);

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/long.mov"));

    assert!(
        wait_until(|| handle.progress() == "25%"),
        "chunk should arrive while the job is running"
    );
    assert_eq!(handle.outcome(), None, "job must still be running");

    handle.cancel();
    let outcome = handle.wait_timeout(WAIT_BUDGET).expect("job should resolve");
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(handle.progress(), "25%", "captured output survives cancellation");
}

#[test]
fn signal_death_without_cancellation_reports_no_exit_code() {
    let spawner = MockSpawner::new();
    spawner.add_signal_exit_expectation("/crash.mov", 11);

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/crash.mov"));

    let outcome = handle.wait_timeout(WAIT_BUDGET).expect("job should resolve");
    assert_eq!(outcome, Outcome::ToolFailure { code: None });
}

#[test]
fn a_wait_error_resolves_to_tool_failure_with_diagnostics() {
    let spawner = MockSpawner::new();
    spawner.add_wait_error_expectation("/unreapable.mov", vec!["30%"]);

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/unreapable.mov"));

    let outcome = handle.wait_timeout(WAIT_BUDGET).expect("job should resolve");
    assert_eq!(outcome, Outcome::ToolFailure { code: None });
    assert_eq!(handle.progress(), "30%", "chunks read before the error survive");
    assert!(
        handle.diagnostics().contains("wait error:"),
        "the reaping error must land in the diagnostics, got: {}",
        handle.diagnostics()
    );
}

#[test]
fn cancel_after_completion_does_not_rewrite_the_outcome() {
    let spawner = MockSpawner::new();
    spawner.add_success_expectation("/quick.mov", vec!["done"]);

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/quick.mov"));

    assert_eq!(
        handle.wait_timeout(WAIT_BUDGET),
        Some(Outcome::Success)
    );

    handle.cancel();
    handle.cancel();
    assert_eq!(handle.outcome(), Some(Outcome::Success));
}

#[test]
fn empty_stdout_stream_still_resolves_cleanly() {
    let spawner = MockSpawner::new();
    spawner.add_success_expectation("/silent.mov", vec![]);

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/silent.mov"));

    assert_eq!(handle.wait_timeout(WAIT_BUDGET), Some(Outcome::Success));
    assert_eq!(handle.progress(), "");
    assert!(handle.sink().is_empty());
}

#[test]
fn stderr_goes_to_diagnostics_not_the_progress_sink() {
    let spawner = MockSpawner::new();
    spawner.add_exit_error_expectation(
        "/noisy.mov",
        vec!["50%"],
        vec!["deprecated option", "failed to open encoder"],
        2,
    );

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/noisy.mov"));

    assert_eq!(
        handle.wait_timeout(WAIT_BUDGET),
        Some(Outcome::ToolFailure { code: Some(2) })
    );
    assert_eq!(handle.progress(), "50%", "stderr must not leak into the sink");

    let diagnostics = handle.diagnostics();
    assert!(diagnostics.contains("deprecated option"));
    assert!(diagnostics.contains("failed to open encoder"));
}

#[test]
fn concurrent_jobs_stay_fully_independent() {
    let spawner = MockSpawner::new();
    spawner.add_success_expectation("/one.mov", vec!["a1", "a2"]);
    spawner.add_exit_error_expectation("/two.mov", vec!["b1"], vec![], 3);

    let supervisor = JobSupervisor::new(spawner.clone());
    let first = supervisor.start(spec_for("/one.mov"));
    let second = supervisor.start(spec_for("/two.mov"));

    assert_eq!(first.wait_timeout(WAIT_BUDGET), Some(Outcome::Success));
    assert_eq!(
        second.wait_timeout(WAIT_BUDGET),
        Some(Outcome::ToolFailure { code: Some(3) })
    );

    assert_eq!(first.progress(), "a1a2");
    assert_eq!(second.progress(), "b1");
    assert_eq!(spawner.get_received_calls().len(), 2);
}

// --- Event ordering ---

#[derive(Default)]
struct RecordingHandler {
    labels: Mutex<Vec<String>>,
}

impl RecordingHandler {
    fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

impl EventHandler for RecordingHandler {
    fn handle(&self, event: &Event) {
        let label = match event {
            Event::JobStarted { .. } => "started".to_string(),
            Event::ProgressChunk { chunk } => format!("chunk:{chunk}"),
            Event::JobFinished { outcome } => format!("finished:{outcome:?}"),
        };
        self.labels.lock().unwrap().push(label);
    }
}

#[test]
fn the_outcome_event_follows_every_chunk_event() {
    let spawner = MockSpawner::new();
    spawner.add_success_expectation("/ordered.mov", vec!["10%", "55%", "100%"]);

    let handler = Arc::new(RecordingHandler::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_handler(handler.clone());

    let supervisor = JobSupervisor::with_dispatcher(spawner, dispatcher);
    let handle = supervisor.start(spec_for("/ordered.mov"));
    assert_eq!(handle.wait_timeout(WAIT_BUDGET), Some(Outcome::Success));

    let labels = handler.labels();
    assert_eq!(
        labels,
        vec![
            "started".to_string(),
            "chunk:10%".to_string(),
            "chunk:55%".to_string(),
            "chunk:100%".to_string(),
            "finished:Success".to_string(),
        ],
        "chunks must arrive in order, and the outcome strictly last"
    );
}

struct SlowFinishHandler {
    finished_delivered: AtomicBool,
}

impl EventHandler for SlowFinishHandler {
    fn handle(&self, event: &Event) {
        if let Event::JobFinished { .. } = event {
            // Stands in for a handler that is slow to write the event out.
            std::thread::sleep(Duration::from_millis(150));
            self.finished_delivered.store(true, Ordering::SeqCst);
        }
    }
}

#[test]
fn wait_returns_only_after_the_finished_event_is_delivered() {
    let spawner = MockSpawner::new();
    spawner.add_success_expectation("/handled.mov", vec!["ok"]);

    let handler = Arc::new(SlowFinishHandler {
        finished_delivered: AtomicBool::new(false),
    });
    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_handler(handler.clone());

    let supervisor = JobSupervisor::with_dispatcher(spawner, dispatcher);
    let handle = supervisor.start(spec_for("/handled.mov"));

    assert_eq!(handle.wait(), Outcome::Success);
    assert!(
        handler.finished_delivered.load(Ordering::SeqCst),
        "wait() must not return before the finished event is delivered"
    );
}

#[test]
fn starting_a_job_does_not_block_the_caller() {
    let spawner = MockSpawner::new();
    spawner.add_hold_until_kill_expectation("/forever.mov", vec![]);

    let supervisor = JobSupervisor::new(spawner);
    let handle = supervisor.start(spec_for("/forever.mov"));

    // The job cannot resolve on its own, so a non-blocking start leaves the
    // outcome unset.
    assert_eq!(handle.outcome(), None);
    assert!(!handle.is_finished());

    handle.cancel();
    assert_eq!(handle.wait_timeout(WAIT_BUDGET), Some(Outcome::Cancelled));
}
