//! Orchestration pipeline for one-off ECS task runs.
//!
//! Strictly sequential: derive the task-definition document, register
//! it, make sure the log group exists, start one run, poll until it
//! stops, fetch the captured output, and hand back a [`RunReport`] for
//! the caller to turn into a process exit code. Every failure along the
//! way is terminal; the caller's recovery path is re-invocation.

use std::time::Duration;

use ecsrun_aws::ecs::{EcsApiError, EcsTaskApi, RegisteredDefinition, RunHandle};
use ecsrun_aws::logs::{LogsApi, LogsApiError};
use ecsrun_aws::wait::{await_terminal, WaitError, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use ecsrun_core::launch::{validate_network, NetworkSelection};
use ecsrun_core::report::{process_exit_code, RunResult};
use ecsrun_core::taskdef::{build_definition, TaskDefinitionRequest, TaskOverrides};
use ecsrun_core::{naming, CoreError};

// ---------------------------------------------------------------------------
// Settings and report
// ---------------------------------------------------------------------------

/// Where and how patiently to run the one-off task.
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    pub cluster: String,
    /// awsvpc network for Fargate runs; ignored for EC2.
    pub network: Option<NetworkSelection>,
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl ExecutionSettings {
    /// Settings for a cluster with the default wait budget.
    pub fn for_cluster(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            network: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Everything observed about one finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub definition: RegisteredDefinition,
    pub handle: RunHandle,
    pub result: RunResult,
    /// Captured log lines; `None` when no stream was written.
    pub output: Option<Vec<String>>,
}

impl RunReport {
    /// Exit code the invoking process should terminate with.
    pub fn process_exit_code(&self) -> u8 {
        process_exit_code(&self.result)
    }
}

/// Errors from any stage of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Ecs(#[from] EcsApiError),
    #[error(transparent)]
    Logs(#[from] LogsApiError),
    #[error(transparent)]
    Wait(#[from] WaitError),
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Derive a one-off task from the overrides (and reference task, when
/// given), then run it to completion.
pub async fn run_one_off(
    ecs: &EcsTaskApi,
    logs: &LogsApi,
    overrides: &TaskOverrides,
    reference_task: Option<&str>,
    settings: &ExecutionSettings,
) -> Result<RunReport, RunnerError> {
    validate_network(overrides.launch, settings.network.as_ref())?;

    let reference = match reference_task {
        Some(name) => {
            tracing::info!(reference = name, "Copying fields from reference task definition");
            Some(ecs.describe_reference(name).await?)
        }
        None => None,
    };

    let request = build_definition(overrides, reference.as_ref())?;
    execute_definition(ecs, logs, &request, settings).await
}

/// Run an already-built task-definition document to completion.
///
/// Entry point for callers that render (and possibly persist) the
/// document themselves before submission.
pub async fn execute_definition(
    ecs: &EcsTaskApi,
    logs: &LogsApi,
    request: &TaskDefinitionRequest,
    settings: &ExecutionSettings,
) -> Result<RunReport, RunnerError> {
    let launch = request.launch_kind();
    validate_network(launch, settings.network.as_ref())?;

    let definition = ecs.register(request).await?;
    tracing::info!(
        arn = %definition.arn,
        revision = definition.revision,
        "Registered task definition",
    );

    let group = naming::log_group_for_task(&request.family);
    logs.ensure_group(&group, naming::LOG_RETENTION_DAYS).await?;

    let handle = ecs
        .start_run(
            &settings.cluster,
            &definition.arn,
            launch,
            settings.network.as_ref(),
        )
        .await?;
    tracing::info!(
        task_arn = %handle.task_arn,
        cluster = %settings.cluster,
        "Started one-off task, waiting for it to stop",
    );

    let result = await_terminal(ecs, &handle, settings.poll_interval, settings.max_attempts).await?;

    let container_name = request
        .container_definitions
        .first()
        .map(|c| c.name.as_str())
        .unwrap_or(&request.family);
    let stream = naming::log_stream_for_run(container_name, &handle.task_arn);
    let output = logs.fetch_output(&group, &stream).await?;

    Ok(RunReport {
        definition,
        handle,
        result,
        output,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use ecsrun_core::report::TERMINAL_STATUS;

    use super::*;

    fn report_with_exit(exit_code: Option<i32>) -> RunReport {
        RunReport {
            definition: RegisteredDefinition {
                arn: "arn:aws:ecs:us-east-1:123:task-definition/db-migrations:7".to_string(),
                revision: 7,
            },
            handle: RunHandle {
                cluster: "myEcsCluster".to_string(),
                task_arn: "arn:aws:ecs:us-east-1:123:task/myEcsCluster/abc".to_string(),
            },
            result: RunResult {
                last_status: TERMINAL_STATUS.to_string(),
                exit_code,
                exit_reason: None,
                stopped_reason: None,
            },
            output: None,
        }
    }

    #[test]
    fn clean_run_reports_exit_zero() {
        assert_eq!(report_with_exit(Some(0)).process_exit_code(), 0);
    }

    #[test]
    fn killed_container_reports_exit_one() {
        assert_eq!(report_with_exit(Some(137)).process_exit_code(), 1);
    }

    #[test]
    fn never_started_container_reports_exit_one() {
        assert_eq!(report_with_exit(None).process_exit_code(), 1);
    }

    #[test]
    fn default_settings_use_bounded_wait_budget() {
        let settings = ExecutionSettings::for_cluster("myEcsCluster");
        assert_eq!(settings.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(settings.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(settings.network.is_none());
    }
}
