//! Terminal-run snapshot and the exit-code mapping.
//!
//! A [`RunResult`] is a read-only view of what ECS reported for a
//! stopped task. [`process_exit_code`] is the single business rule of
//! the tool: container exit 0 means process exit 0, anything else
//! (including a container that never started) means process exit 1.

/// Status string ECS reports once a task has reached its terminal state.
pub const TERMINAL_STATUS: &str = "STOPPED";

/// Terminal snapshot of one task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Last status reported by ECS (`PROVISIONING`, `RUNNING`, `STOPPED`, ...).
    pub last_status: String,
    /// Exit code of the primary container; `None` if it never started.
    pub exit_code: Option<i32>,
    /// Container-level reason, e.g. an image pull failure.
    pub exit_reason: Option<String>,
    /// Task-level stop reason.
    pub stopped_reason: Option<String>,
}

impl RunResult {
    /// Whether the run has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        self.last_status == TERMINAL_STATUS
    }

    /// Whether the primary container exited cleanly.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Map a terminal run onto the process exit code.
pub fn process_exit_code(result: &RunResult) -> u8 {
    if result.succeeded() {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stopped(exit_code: Option<i32>) -> RunResult {
        RunResult {
            last_status: TERMINAL_STATUS.to_string(),
            exit_code,
            exit_reason: None,
            stopped_reason: None,
        }
    }

    #[test]
    fn clean_exit_maps_to_zero() {
        assert_eq!(process_exit_code(&stopped(Some(0))), 0);
    }

    #[test]
    fn nonzero_exit_maps_to_one() {
        assert_eq!(process_exit_code(&stopped(Some(137))), 1);
    }

    #[test]
    fn absent_exit_code_maps_to_one() {
        assert_eq!(process_exit_code(&stopped(None)), 1);
    }

    #[test]
    fn stopped_status_is_terminal() {
        assert!(stopped(Some(0)).is_terminal());
    }

    #[test]
    fn running_status_is_not_terminal() {
        let result = RunResult {
            last_status: "RUNNING".to_string(),
            exit_code: None,
            exit_reason: None,
            stopped_reason: None,
        };
        assert!(!result.is_terminal());
    }
}
