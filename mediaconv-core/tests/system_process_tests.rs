// mediaconv-core/tests/system_process_tests.rs
//
// End-to-end supervision against real child processes. The "tool" here is
// /bin/sh running small scripts, which exercises the same pipe and exit
// status plumbing as a real transcoder without needing one installed.

use std::time::{Duration, Instant};

use mediaconv_core::{CommandSpec, JobSupervisor, Outcome, SystemSpawner};

const WAIT_BUDGET: Duration = Duration::from_secs(10);

fn shell_job(script: &str) -> CommandSpec {
    CommandSpec::from_tokens(["-c", script])
}

fn supervisor() -> JobSupervisor<SystemSpawner> {
    JobSupervisor::new(SystemSpawner::new("/bin/sh"))
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
fn stdout_of_a_real_process_lands_in_the_sink() {
    let handle = supervisor().start(shell_job("printf '10%%'; printf '55%%'; printf '100%%'"));

    let outcome = handle.wait_timeout(WAIT_BUDGET).expect("job should resolve");
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(handle.progress(), "10%55%100%");
}

#[test]
fn real_nonzero_exit_carries_its_code() {
    let handle = supervisor().start(shell_job("exit 7"));

    assert_eq!(
        handle.wait_timeout(WAIT_BUDGET),
        Some(Outcome::ToolFailure { code: Some(7) })
    );
}

#[test]
fn real_stderr_is_kept_as_diagnostics() {
    let handle = supervisor().start(shell_job("echo oops >&2; exit 1"));

    assert_eq!(
        handle.wait_timeout(WAIT_BUDGET),
        Some(Outcome::ToolFailure { code: Some(1) })
    );
    assert_eq!(handle.progress(), "", "stderr must stay out of the sink");
    assert!(handle.diagnostics().contains("oops"));
}

#[test]
fn missing_binary_reports_a_spawn_failure() {
    let supervisor = JobSupervisor::new(SystemSpawner::new("/definitely/not/a/real/tool"));
    let handle = supervisor.start(shell_job("exit 0"));

    let outcome = handle.wait_timeout(WAIT_BUDGET).expect("job should resolve");
    match outcome {
        Outcome::SpawnFailure { reason } => assert!(!reason.is_empty()),
        other => panic!("expected SpawnFailure, got {other:?}"),
    }
}

#[test]
fn cancelling_a_running_process_resolves_to_cancelled() {
    let handle = supervisor().start(shell_job("printf 'started'; exec sleep 30"));

    assert!(
        wait_until(|| handle.progress() == "started"),
        "the first chunk should arrive while the process sleeps"
    );
    assert_eq!(handle.outcome(), None);

    handle.cancel();
    assert_eq!(handle.wait_timeout(WAIT_BUDGET), Some(Outcome::Cancelled));
    assert_eq!(handle.progress(), "started");
}

#[test]
fn a_process_killed_from_outside_reports_no_exit_code() {
    let handle = supervisor().start(shell_job("kill -9 $$"));

    assert_eq!(
        handle.wait_timeout(WAIT_BUDGET),
        Some(Outcome::ToolFailure { code: None })
    );
}

#[test]
fn progress_grows_incrementally_while_the_process_runs() {
    let handle = supervisor().start(shell_job(
        "printf 'one'; sleep 0.3; printf 'two'; sleep 0.3; printf 'three'",
    ));

    assert!(wait_until(|| handle.progress().starts_with("one")));
    assert!(wait_until(|| handle.progress().starts_with("onetwo")));

    assert_eq!(handle.wait_timeout(WAIT_BUDGET), Some(Outcome::Success));
    assert_eq!(handle.progress(), "onetwothree");
}
