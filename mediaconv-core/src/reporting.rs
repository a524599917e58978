//! Human-readable reporting of job outcomes.
//!
//! Every [`Outcome`] maps to its own message so the four terminal states are
//! distinguishable at a glance: success, a tool that ran and failed, a tool
//! that never started, and a cancelled job.

use crate::jobs::Outcome;

/// The user-facing summary line for a resolved job.
pub fn outcome_message(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success => "Conversion complete!".to_string(),
        Outcome::ToolFailure { code: Some(code) } => {
            format!("Conversion failed with exit code {code}")
        }
        Outcome::ToolFailure { code: None } => {
            "Conversion failed: tool terminated without an exit code".to_string()
        }
        Outcome::SpawnFailure { reason } => {
            format!("Conversion could not start: {reason}")
        }
        Outcome::Cancelled => "Conversion cancelled before completion".to_string(),
    }
}

/// Process exit code for a resolved job.
///
/// Cancellation uses 124, matching the convention of timeout wrappers.
pub fn outcome_exit_code(outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::Success => 0,
        Outcome::ToolFailure { .. } | Outcome::SpawnFailure { .. } => 1,
        Outcome::Cancelled => 124,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_message_is_exact() {
        assert_eq!(outcome_message(&Outcome::Success), "Conversion complete!");
    }

    #[test]
    fn tool_failure_message_carries_the_exit_code() {
        assert_eq!(
            outcome_message(&Outcome::ToolFailure { code: Some(3) }),
            "Conversion failed with exit code 3"
        );
    }

    #[test]
    fn each_terminal_state_reads_differently() {
        let outcomes = [
            Outcome::Success,
            Outcome::ToolFailure { code: Some(1) },
            Outcome::ToolFailure { code: None },
            Outcome::SpawnFailure {
                reason: "No such file or directory".to_string(),
            },
            Outcome::Cancelled,
        ];

        let messages: Vec<String> = outcomes.iter().map(outcome_message).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b, "outcome messages must be distinguishable");
            }
        }
    }

    #[test]
    fn spawn_failure_message_includes_the_reason() {
        let message = outcome_message(&Outcome::SpawnFailure {
            reason: "No such file or directory".to_string(),
        });
        assert!(message.contains("could not start"));
        assert!(message.contains("No such file or directory"));
    }

    #[test]
    fn exit_codes_follow_the_shell_conventions() {
        assert_eq!(outcome_exit_code(&Outcome::Success), 0);
        assert_eq!(outcome_exit_code(&Outcome::ToolFailure { code: Some(7) }), 1);
        assert_eq!(
            outcome_exit_code(&Outcome::SpawnFailure {
                reason: String::new()
            }),
            1
        );
        assert_eq!(outcome_exit_code(&Outcome::Cancelled), 124);
    }
}
