//! ECS API client for one-off task runs.
//!
//! [`EcsTaskApi`] wraps the three write paths (register task
//! definition, run task) and two read paths (describe task definition,
//! describe task) this tool needs. Remote rejections are mapped onto
//! the error variant for the operation that failed and are never
//! retried; a one-off run is a single-shot operation.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecs::error::{BuildError, DisplayErrorContext};
use aws_sdk_ecs::types;

use ecsrun_core::launch::{LaunchKind, NetworkSelection};
use ecsrun_core::report::RunResult;
use ecsrun_core::taskdef::{
    ContainerSpec, EnvFileKind, EnvFileRef, EnvVar, ReferenceFields, SecretRef,
    TaskDefinitionRequest,
};

use crate::wait::RunStatusSource;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Identifier of a freshly registered task-definition revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredDefinition {
    pub arn: String,
    pub revision: i32,
}

/// Identifier of one started task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub cluster: String,
    pub task_arn: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the ECS API layer, one variant per operation.
#[derive(Debug, thiserror::Error)]
pub enum EcsApiError {
    /// The reference task definition could not be fetched.
    #[error("Reference task definition lookup failed: {0}")]
    ReferenceLookup(String),

    /// ECS rejected the task-definition document.
    #[error("Task definition registration rejected: {0}")]
    Registration(String),

    /// The run could not be started (unknown cluster, no capacity,
    /// missing `iam:PassRole`, ...).
    #[error("Task run could not be started: {0}")]
    RunStart(String),

    /// A status check on a started run failed.
    #[error("Task status lookup failed: {0}")]
    Describe(String),

    /// ECS answered without the fields the response must carry.
    #[error("Unexpected response from ECS: {0}")]
    MalformedResponse(&'static str),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// ECS client scoped to one-off task operations.
pub struct EcsTaskApi {
    client: aws_sdk_ecs::Client,
}

impl EcsTaskApi {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ecs::Client::new(config),
        }
    }

    /// Fetch the latest active revision of a reference task definition
    /// and extract the fields carried forward into the one-off task.
    pub async fn describe_reference(
        &self,
        task_definition: &str,
    ) -> Result<ReferenceFields, EcsApiError> {
        let output = self
            .client
            .describe_task_definition()
            .task_definition(task_definition)
            .send()
            .await
            .map_err(|e| EcsApiError::ReferenceLookup(format!("{}", DisplayErrorContext(&e))))?;

        let definition = output.task_definition().ok_or(EcsApiError::MalformedResponse(
            "describe_task_definition returned no task definition",
        ))?;

        reference_fields_from(definition)
    }

    /// Register the document as a new task-definition revision.
    pub async fn register(
        &self,
        request: &TaskDefinitionRequest,
    ) -> Result<RegisteredDefinition, EcsApiError> {
        let mut call = self
            .client
            .register_task_definition()
            .family(request.family.clone());

        if let Some(role) = &request.execution_role_arn {
            call = call.execution_role_arn(role.clone());
        }
        for spec in &request.container_definitions {
            call = call.container_definitions(container_definition(spec)?);
        }
        if let Some(mode) = &request.network_mode {
            call = call.network_mode(types::NetworkMode::from(mode.as_str()));
        }
        for compat in &request.requires_compatibilities {
            call = call.requires_compatibilities(types::Compatibility::from(compat.as_str()));
        }
        if let Some(cpu) = &request.cpu {
            call = call.cpu(cpu.clone());
        }
        if let Some(memory) = &request.memory {
            call = call.memory(memory.clone());
        }

        let output = call
            .send()
            .await
            .map_err(|e| EcsApiError::Registration(format!("{}", DisplayErrorContext(&e))))?;

        let definition = output.task_definition().ok_or(EcsApiError::MalformedResponse(
            "register_task_definition returned no task definition",
        ))?;
        let arn = definition
            .task_definition_arn()
            .ok_or(EcsApiError::MalformedResponse(
                "registered task definition has no ARN",
            ))?;

        Ok(RegisteredDefinition {
            arn: arn.to_string(),
            revision: definition.revision(),
        })
    }

    /// Start exactly one run of the given revision on a cluster.
    ///
    /// Fargate runs are placed into the provided awsvpc network with a
    /// public IP disabled; EC2 runs use the cluster's own placement.
    pub async fn start_run(
        &self,
        cluster: &str,
        definition_arn: &str,
        launch: LaunchKind,
        network: Option<&NetworkSelection>,
    ) -> Result<RunHandle, EcsApiError> {
        let mut call = self
            .client
            .run_task()
            .cluster(cluster)
            .task_definition(definition_arn)
            .count(1);

        if launch == LaunchKind::Fargate {
            let network = network.ok_or(EcsApiError::MalformedResponse(
                "Fargate run started without a network selection",
            ))?;
            let mut vpc = types::AwsVpcConfiguration::builder()
                .assign_public_ip(types::AssignPublicIp::Disabled);
            for subnet in &network.subnets {
                vpc = vpc.subnets(subnet.clone());
            }
            for group in &network.security_groups {
                vpc = vpc.security_groups(group.clone());
            }
            call = call.launch_type(types::LaunchType::Fargate).network_configuration(
                types::NetworkConfiguration::builder()
                    .awsvpc_configuration(vpc.build().map_err(request_shape_error)?)
                    .build(),
            );
        }

        let output = call
            .send()
            .await
            .map_err(|e| EcsApiError::RunStart(format!("{}", DisplayErrorContext(&e))))?;

        if let Some(failure) = output.failures().first() {
            return Err(EcsApiError::RunStart(format!(
                "{}: {}",
                failure.reason().unwrap_or("unknown reason"),
                failure.detail().unwrap_or("no detail"),
            )));
        }

        let task = output.tasks().first().ok_or(EcsApiError::MalformedResponse(
            "run_task returned no tasks and no failures",
        ))?;
        let task_arn = task.task_arn().ok_or(EcsApiError::MalformedResponse(
            "started task has no ARN",
        ))?;

        Ok(RunHandle {
            cluster: cluster.to_string(),
            task_arn: task_arn.to_string(),
        })
    }
}

#[async_trait]
impl RunStatusSource for EcsTaskApi {
    async fn describe_run(&self, handle: &RunHandle) -> Result<RunResult, EcsApiError> {
        let output = self
            .client
            .describe_tasks()
            .cluster(handle.cluster.clone())
            .tasks(handle.task_arn.clone())
            .send()
            .await
            .map_err(|e| EcsApiError::Describe(format!("{}", DisplayErrorContext(&e))))?;

        if let Some(failure) = output.failures().first() {
            return Err(EcsApiError::Describe(format!(
                "{}: {}",
                failure.reason().unwrap_or("unknown reason"),
                failure.detail().unwrap_or("no detail"),
            )));
        }

        let task = output.tasks().first().ok_or(EcsApiError::MalformedResponse(
            "describe_tasks returned no tasks and no failures",
        ))?;

        Ok(run_result_from(task))
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Extract the carried-forward fields from a reference task definition.
///
/// Only the first container is consulted; service-assigned fields (ARN,
/// revision, status, registration metadata) are structurally excluded
/// because [`ReferenceFields`] has no place for them.
pub fn reference_fields_from(
    definition: &types::TaskDefinition,
) -> Result<ReferenceFields, EcsApiError> {
    let container = definition
        .container_definitions()
        .first()
        .ok_or(EcsApiError::MalformedResponse(
            "reference task definition has no containers",
        ))?;

    Ok(ReferenceFields {
        execution_role_arn: definition.execution_role_arn().map(str::to_string),
        secrets: container
            .secrets()
            .iter()
            .map(|s| SecretRef {
                name: s.name().to_string(),
                value_from: s.value_from().to_string(),
            })
            .collect(),
        environment_files: container
            .environment_files()
            .iter()
            .filter_map(|f| match f.r#type() {
                types::EnvironmentFileType::S3 => Some(EnvFileRef {
                    value: f.value().to_string(),
                    kind: EnvFileKind::S3,
                }),
                _ => None,
            })
            .collect(),
        environment: container
            .environment()
            .iter()
            .filter_map(|kv| {
                Some(EnvVar {
                    name: kv.name()?.to_string(),
                    value: kv.value()?.to_string(),
                })
            })
            .collect(),
    })
}

/// Snapshot a described task into a [`RunResult`].
pub fn run_result_from(task: &types::Task) -> RunResult {
    let container = task.containers().first();
    RunResult {
        last_status: task.last_status().unwrap_or("UNKNOWN").to_string(),
        exit_code: container.and_then(|c| c.exit_code()),
        exit_reason: container.and_then(|c| c.reason()).map(str::to_string),
        stopped_reason: task.stopped_reason().map(str::to_string),
    }
}

/// Build the SDK container definition from the document model.
fn container_definition(spec: &ContainerSpec) -> Result<types::ContainerDefinition, EcsApiError> {
    let mut builder = types::ContainerDefinition::builder()
        .name(spec.name.clone())
        .image(spec.image.clone())
        .cpu(spec.cpu)
        .memory(spec.memory)
        .memory_reservation(spec.memory_reservation)
        .set_entry_point(non_empty(&spec.entry_point))
        .set_command(non_empty(&spec.command));

    for secret in &spec.secrets {
        builder = builder.secrets(
            types::Secret::builder()
                .name(secret.name.clone())
                .value_from(secret.value_from.clone())
                .build()
                .map_err(request_shape_error)?,
        );
    }
    for file in &spec.environment_files {
        builder = builder.environment_files(
            types::EnvironmentFile::builder()
                .value(file.value.clone())
                .r#type(env_file_type(file.kind))
                .build()
                .map_err(request_shape_error)?,
        );
    }
    for var in &spec.environment {
        builder = builder.environment(
            types::KeyValuePair::builder()
                .name(var.name.clone())
                .value(var.value.clone())
                .build(),
        );
    }
    if let Some(routing) = &spec.log_configuration {
        builder = builder.log_configuration(
            types::LogConfiguration::builder()
                .log_driver(types::LogDriver::from(routing.log_driver.as_str()))
                .options("awslogs-group", routing.options.group.clone())
                .options("awslogs-region", routing.options.region.clone())
                .options("awslogs-stream-prefix", routing.options.stream_prefix.clone())
                .build()
                .map_err(request_shape_error)?,
        );
    }

    Ok(builder.build())
}

fn env_file_type(kind: EnvFileKind) -> types::EnvironmentFileType {
    match kind {
        EnvFileKind::S3 => types::EnvironmentFileType::S3,
    }
}

fn non_empty(tokens: &[String]) -> Option<Vec<String>> {
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.to_vec())
    }
}

fn request_shape_error(e: BuildError) -> EcsApiError {
    EcsApiError::Registration(e.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use ecsrun_core::taskdef::{build_definition, split_tokens, TaskOverrides};

    use super::*;

    fn sample_spec() -> ContainerSpec {
        let overrides = TaskOverrides {
            task_name: "db-migrations".to_string(),
            image: "myapp:latest".to_string(),
            entry_point: split_tokens("sh -c"),
            command: split_tokens("bundle exec rake db:migrate"),
            execution_role_arn: Some("arn:aws:iam::123:role/ecsTaskExecutionRole".to_string()),
            environment_files: vec![EnvFileRef {
                value: "arn:aws:s3:::bucket/vars.env".to_string(),
                kind: EnvFileKind::S3,
            }],
            launch: LaunchKind::Ec2,
            region: "us-east-1".to_string(),
        };
        build_definition(&overrides, None)
            .unwrap()
            .container_definitions
            .remove(0)
    }

    // -- Request conversion --

    #[test]
    fn container_definition_carries_name_image_and_tokens() {
        let definition = container_definition(&sample_spec()).unwrap();
        assert_eq!(definition.name(), Some("db-migrations"));
        assert_eq!(definition.image(), Some("myapp:latest"));
        assert_eq!(definition.entry_point(), ["sh", "-c"]);
        assert_eq!(
            definition.command(),
            ["bundle", "exec", "rake", "db:migrate"]
        );
    }

    #[test]
    fn container_definition_maps_env_files_to_s3() {
        let definition = container_definition(&sample_spec()).unwrap();
        let files = definition.environment_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].value(), "arn:aws:s3:::bucket/vars.env");
        assert_eq!(files[0].r#type(), &types::EnvironmentFileType::S3);
    }

    #[test]
    fn container_definition_sets_awslogs_options() {
        let definition = container_definition(&sample_spec()).unwrap();
        let routing = definition.log_configuration().unwrap();
        assert_eq!(routing.log_driver(), &types::LogDriver::Awslogs);
        let options = routing.options().unwrap();
        assert_eq!(
            options.get("awslogs-group").map(String::as_str),
            Some("/ecs/db-migrations")
        );
        assert_eq!(
            options.get("awslogs-stream-prefix").map(String::as_str),
            Some("ecs")
        );
    }

    #[test]
    fn empty_entry_point_is_omitted() {
        let mut spec = sample_spec();
        spec.entry_point.clear();
        let definition = container_definition(&spec).unwrap();
        assert!(definition.entry_point().is_empty());
    }

    // -- Reference extraction --

    #[test]
    fn reference_fields_extracts_first_container() {
        let definition = types::TaskDefinition::builder()
            .execution_role_arn("arn:aws:iam::123:role/referenceRole")
            .container_definitions(
                types::ContainerDefinition::builder()
                    .name("web")
                    .secrets(
                        types::Secret::builder()
                            .name("DB_PASSWORD")
                            .value_from("arn:aws:ssm:us-east-1:123:parameter/db-password")
                            .build()
                            .unwrap(),
                    )
                    .environment_files(
                        types::EnvironmentFile::builder()
                            .value("arn:aws:s3:::bucket/vars.env")
                            .r#type(types::EnvironmentFileType::S3)
                            .build()
                            .unwrap(),
                    )
                    .environment(
                        types::KeyValuePair::builder()
                            .name("RAILS_ENV")
                            .value("production")
                            .build(),
                    )
                    .build(),
            )
            .build();

        let fields = reference_fields_from(&definition).unwrap();
        assert_eq!(
            fields.execution_role_arn.as_deref(),
            Some("arn:aws:iam::123:role/referenceRole")
        );
        assert_eq!(fields.secrets[0].name, "DB_PASSWORD");
        assert_eq!(fields.environment_files[0].kind, EnvFileKind::S3);
        assert_eq!(fields.environment[0].value, "production");
    }

    #[test]
    fn reference_without_containers_is_malformed() {
        let definition = types::TaskDefinition::builder().build();
        assert_matches!(
            reference_fields_from(&definition),
            Err(EcsApiError::MalformedResponse(_))
        );
    }

    // -- Run snapshots --

    #[test]
    fn run_result_reads_container_exit_code() {
        let task = types::Task::builder()
            .last_status("STOPPED")
            .stopped_reason("Essential container in task exited")
            .containers(
                types::Container::builder()
                    .name("db-migrations")
                    .exit_code(137)
                    .reason("OutOfMemoryError")
                    .build(),
            )
            .build();

        let result = run_result_from(&task);
        assert_eq!(result.last_status, "STOPPED");
        assert_eq!(result.exit_code, Some(137));
        assert_eq!(result.exit_reason.as_deref(), Some("OutOfMemoryError"));
        assert_eq!(
            result.stopped_reason.as_deref(),
            Some("Essential container in task exited")
        );
    }

    #[test]
    fn run_result_tolerates_missing_container() {
        let task = types::Task::builder().last_status("PROVISIONING").build();
        let result = run_result_from(&task);
        assert_eq!(result.last_status, "PROVISIONING");
        assert_eq!(result.exit_code, None);
    }
}
