//! Bounded poller for the stopped state.
//!
//! One run is tracked per invocation, so the wait is a plain loop with
//! a fixed sleep: check, sleep, check again, up to an attempt budget.
//! The budget is an attempt count, not a wall-clock deadline, and an
//! exhausted budget never cancels the remote run.

use std::time::Duration;

use async_trait::async_trait;

use ecsrun_core::report::RunResult;

use crate::ecs::{EcsApiError, RunHandle};

/// Seconds between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(6);

/// Maximum number of status checks before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Source of run-status snapshots, polled by [`await_terminal`].
#[async_trait]
pub trait RunStatusSource {
    async fn describe_run(&self, handle: &RunHandle) -> Result<RunResult, EcsApiError>;
}

/// Errors from the wait loop.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// The attempt budget ran out while the run was still non-terminal.
    #[error("Task did not stop within {attempts} status checks (last status: {last_status})")]
    Timeout { attempts: u32, last_status: String },

    /// A status check itself failed.
    #[error(transparent)]
    Api(#[from] EcsApiError),
}

/// Poll until the run reaches its terminal state.
///
/// Issues at most `max_attempts` status checks spaced `poll_interval`
/// apart and returns the first terminal snapshot. A failed check is
/// fatal; an exhausted budget yields [`WaitError::Timeout`].
pub async fn await_terminal<S: RunStatusSource + ?Sized>(
    source: &S,
    handle: &RunHandle,
    poll_interval: Duration,
    max_attempts: u32,
) -> Result<RunResult, WaitError> {
    let mut last_status = "UNKNOWN".to_string();

    for attempt in 1..=max_attempts {
        let result = source.describe_run(handle).await?;
        if result.is_terminal() {
            tracing::debug!(attempt, task_arn = %handle.task_arn, "Task stopped");
            return Ok(result);
        }
        last_status = result.last_status;
        tracing::debug!(
            attempt,
            max_attempts,
            status = %last_status,
            "Task not stopped yet",
        );
        if attempt < max_attempts {
            tokio::time::sleep(poll_interval).await;
        }
    }

    Err(WaitError::Timeout {
        attempts: max_attempts,
        last_status,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
