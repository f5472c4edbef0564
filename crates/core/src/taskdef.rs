//! Task-definition document model and derivation rules.
//!
//! A [`TaskDefinitionRequest`] is built fresh on every invocation from
//! caller-supplied overrides, optionally merged with fields extracted
//! from an existing reference task definition. The document serializes
//! to the ECS wire shape (camelCase keys), which is also the format of
//! the local JSON artifact the basic front-end writes before
//! submission.
//!
//! The document never carries a revision or log-stream identifier:
//! those are assigned by ECS on registration.

use serde::Serialize;

use crate::error::CoreError;
use crate::launch::LaunchKind;
use crate::naming;

// ---------------------------------------------------------------------------
// Container defaults
// ---------------------------------------------------------------------------

/// CPU units reserved for the one-off container.
pub const DEFAULT_CONTAINER_CPU: i32 = 128;
/// Hard memory limit for the one-off container, in MiB.
pub const DEFAULT_CONTAINER_MEMORY_MB: i32 = 400;
/// Soft memory reservation for the one-off container, in MiB.
pub const DEFAULT_CONTAINER_MEMORY_RESERVATION_MB: i32 = 300;
/// Task-level CPU for Fargate tasks (Fargate requires a task size).
pub const FARGATE_TASK_CPU: &str = "256";
/// Task-level memory for Fargate tasks, in MiB.
pub const FARGATE_TASK_MEMORY: &str = "512";

/// Log driver used to route container output to CloudWatch Logs.
pub const AWSLOGS_DRIVER: &str = "awslogs";

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// The document submitted to `RegisterTaskDefinition`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinitionRequest {
    pub family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,
    /// Always exactly one container for a one-off task.
    pub container_definitions: Vec<ContainerSpec>,
    /// `awsvpc` for Fargate tasks, absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires_compatibilities: Vec<String>,
    /// Task-level CPU, set for Fargate only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Task-level memory, set for Fargate only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl TaskDefinitionRequest {
    /// Launch type the document was built for, read back from the
    /// compatibility list.
    pub fn launch_kind(&self) -> LaunchKind {
        if self.requires_compatibilities.iter().any(|c| c == "FARGATE") {
            LaunchKind::Fargate
        } else {
            LaunchKind::Ec2
        }
    }
}

/// One container of a task definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub cpu: i32,
    pub memory: i32,
    pub memory_reservation: i32,
    pub entry_point: Vec<String>,
    pub command: Vec<String>,
    pub environment: Vec<EnvVar>,
    pub environment_files: Vec<EnvFileRef>,
    pub secrets: Vec<SecretRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_configuration: Option<LogRouting>,
}

/// An inline environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// A reference to an externally stored environment file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvFileRef {
    /// Source location, e.g. an S3 object ARN.
    pub value: String,
    #[serde(rename = "type")]
    pub kind: EnvFileKind,
}

/// Storage kind of an environment file. ECS currently supports S3 only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnvFileKind {
    #[serde(rename = "s3")]
    S3,
}

/// A secret injected into the container at start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: String,
    /// ARN of the Secrets Manager secret or SSM parameter.
    pub value_from: String,
}

/// Log routing configuration for the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRouting {
    pub log_driver: String,
    pub options: LogOptions,
}

/// Driver options for the `awslogs` driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogOptions {
    #[serde(rename = "awslogs-group")]
    pub group: String,
    #[serde(rename = "awslogs-region")]
    pub region: String,
    #[serde(rename = "awslogs-stream-prefix")]
    pub stream_prefix: String,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Caller-supplied values for the one-off task.
///
/// Whenever an override and a reference field both specify a value,
/// the override wins.
#[derive(Debug, Clone, Default)]
pub struct TaskOverrides {
    /// Family name of the new task definition; also used as the
    /// container name and to derive the log group.
    pub task_name: String,
    /// Container image, `repository:tag`.
    pub image: String,
    /// Ordered entry-point tokens; empty means "use the image default".
    pub entry_point: Vec<String>,
    /// Ordered command tokens.
    pub command: Vec<String>,
    pub execution_role_arn: Option<String>,
    pub environment_files: Vec<EnvFileRef>,
    pub launch: LaunchKind,
    /// Region written into the awslogs driver options.
    pub region: String,
}

/// Fields carried forward from a reference task definition.
///
/// Only the first container of the reference is consulted. Fields the
/// service assigns (ARN, revision, status, registration metadata) are
/// never part of this set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceFields {
    pub execution_role_arn: Option<String>,
    pub secrets: Vec<SecretRef>,
    pub environment_files: Vec<EnvFileRef>,
    pub environment: Vec<EnvVar>,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Build the task-definition document for a one-off run.
///
/// Pure: no network effect. Fails with [`CoreError::MissingArgument`]
/// when a required override is empty. When `reference` is given, its
/// secrets, environment files, inline environment, and execution role
/// are copied forward unless the overrides already supply them.
pub fn build_definition(
    overrides: &TaskOverrides,
    reference: Option<&ReferenceFields>,
) -> Result<TaskDefinitionRequest, CoreError> {
    if overrides.task_name.is_empty() {
        return Err(CoreError::MissingArgument("task name"));
    }
    if overrides.image.is_empty() {
        return Err(CoreError::MissingArgument("image"));
    }
    if overrides.command.is_empty() {
        return Err(CoreError::MissingArgument("command"));
    }
    if overrides.region.is_empty() {
        return Err(CoreError::MissingArgument("region"));
    }

    let execution_role_arn = overrides
        .execution_role_arn
        .clone()
        .or_else(|| reference.and_then(|r| r.execution_role_arn.clone()));

    let environment_files = if overrides.environment_files.is_empty() {
        reference.map(|r| r.environment_files.clone()).unwrap_or_default()
    } else {
        overrides.environment_files.clone()
    };

    let container = ContainerSpec {
        name: overrides.task_name.clone(),
        image: overrides.image.clone(),
        cpu: DEFAULT_CONTAINER_CPU,
        memory: DEFAULT_CONTAINER_MEMORY_MB,
        memory_reservation: DEFAULT_CONTAINER_MEMORY_RESERVATION_MB,
        entry_point: overrides.entry_point.clone(),
        command: overrides.command.clone(),
        environment: reference.map(|r| r.environment.clone()).unwrap_or_default(),
        environment_files,
        secrets: reference.map(|r| r.secrets.clone()).unwrap_or_default(),
        log_configuration: Some(LogRouting {
            log_driver: AWSLOGS_DRIVER.to_string(),
            options: LogOptions {
                group: naming::log_group_for_task(&overrides.task_name),
                region: overrides.region.clone(),
                stream_prefix: naming::LOG_STREAM_PREFIX.to_string(),
            },
        }),
    };

    let mut request = TaskDefinitionRequest {
        family: overrides.task_name.clone(),
        execution_role_arn,
        container_definitions: vec![container],
        network_mode: None,
        requires_compatibilities: Vec::new(),
        cpu: None,
        memory: None,
    };

    if overrides.launch == LaunchKind::Fargate {
        request.network_mode = Some("awsvpc".to_string());
        request.requires_compatibilities = vec!["FARGATE".to_string()];
        request.cpu = Some(FARGATE_TASK_CPU.to_string());
        request.memory = Some(FARGATE_TASK_MEMORY.to_string());
    }

    Ok(request)
}

/// Split a flag value like `"sh -c"` into ordered tokens.
///
/// Runs of whitespace collapse; an empty or all-whitespace input yields
/// no tokens.
pub fn split_tokens(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
