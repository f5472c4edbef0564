//! Argument definitions for both front-ends.

use clap::{Parser, ValueEnum};

use ecsrun_core::launch::{LaunchKind, NetworkSelection};
use ecsrun_core::taskdef::{split_tokens, EnvFileKind, EnvFileRef, TaskOverrides};
use ecsrun_core::CoreError;

/// Launch type flag values.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchTypeArg {
    #[value(name = "EC2")]
    Ec2,
    #[value(name = "FARGATE")]
    Fargate,
}

impl From<LaunchTypeArg> for LaunchKind {
    fn from(value: LaunchTypeArg) -> Self {
        match value {
            LaunchTypeArg::Ec2 => LaunchKind::Ec2,
            LaunchTypeArg::Fargate => LaunchKind::Fargate,
        }
    }
}

/// Arguments of the flag-driven front-end.
#[derive(Parser, Debug)]
#[command(name = "ecsrun")]
#[command(about = "Run a one-off ECS task derived from an existing task definition")]
#[command(version)]
pub struct RunArgs {
    /// Name for the one-off task (family, container name, and log group)
    #[arg(long)]
    pub task_name: String,

    /// Reference task definition to copy secrets, environment files,
    /// inline environment, and the execution role from
    #[arg(long)]
    pub from_task: String,

    /// ECS cluster to run on
    #[arg(long)]
    pub cluster: String,

    /// Image URI for the one-off task
    #[arg(long)]
    pub image: String,

    /// Entry point for the one-off task, e.g. 'sh -c'
    #[arg(long)]
    pub entrypoint: Option<String>,

    /// Command for the one-off task
    #[arg(long, num_args = 1.., required = true)]
    pub command: Vec<String>,

    /// Launch type on which to run the one-off task
    #[arg(long, value_enum, default_value = "EC2")]
    pub launch_type: LaunchTypeArg,

    /// Subnet IDs for a FARGATE run; all must belong to the same VPC
    #[arg(long = "networks-id", num_args = 1..)]
    pub networks_id: Vec<String>,

    /// Security-group IDs for a FARGATE run
    #[arg(long = "security-groups-id", num_args = 1..)]
    pub security_groups_id: Vec<String>,

    /// AWS profile to perform the operations
    #[arg(short, long)]
    pub profile: Option<String>,

    /// AWS region to perform the operations
    #[arg(short, long)]
    pub region: Option<String>,
}

impl RunArgs {
    /// Caller-supplied overrides for the derived task definition.
    ///
    /// The execution role and environment files are left unset here:
    /// they come from the reference task unless overridden.
    pub fn overrides(&self, region: String) -> TaskOverrides {
        TaskOverrides {
            task_name: self.task_name.clone(),
            image: self.image.clone(),
            entry_point: self
                .entrypoint
                .as_deref()
                .map(split_tokens)
                .unwrap_or_default(),
            command: self.command.clone(),
            execution_role_arn: None,
            environment_files: Vec::new(),
            launch: self.launch_type.into(),
            region,
        }
    }

    /// awsvpc network selection, when any network flag was given.
    pub fn network(&self) -> Option<NetworkSelection> {
        if self.networks_id.is_empty() && self.security_groups_id.is_empty() {
            return None;
        }
        Some(NetworkSelection {
            subnets: self.networks_id.clone(),
            security_groups: self.security_groups_id.clone(),
        })
    }
}

/// Arguments of the positional front-end.
///
/// All seven values are required and must be non-empty; the order is
/// fixed and validated before any network call.
#[derive(Parser, Debug)]
#[command(name = "ecsrun-basic")]
#[command(about = "Run a one-off ECS task from seven positional arguments")]
#[command(version)]
pub struct BasicArgs {
    /// Name for the one-off task
    pub task_name: String,
    /// Execution role ARN assumed by ECS to pull the image and fetch secrets
    pub execution_role_arn: String,
    /// ECS cluster to run on
    pub cluster: String,
    /// Image URI for the one-off task
    pub image: String,
    /// S3 ARN of the environment file injected into the container
    pub env_file: String,
    /// Entry point, e.g. 'sh -c'
    pub entry_point: String,
    /// Command, e.g. 'bundle exec rake db:migrate'
    pub command: String,
}

impl BasicArgs {
    /// Reject empty positional values before anything else runs.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields: [(&'static str, &str); 7] = [
            ("task name", &self.task_name),
            ("execution role ARN", &self.execution_role_arn),
            ("cluster", &self.cluster),
            ("image", &self.image),
            ("environment file", &self.env_file),
            ("entry point", &self.entry_point),
            ("command", &self.command),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(CoreError::MissingArgument(name));
            }
        }
        Ok(())
    }

    /// Caller-supplied overrides; the basic variant has no reference
    /// task, so everything is explicit.
    pub fn overrides(&self, region: String) -> TaskOverrides {
        TaskOverrides {
            task_name: self.task_name.clone(),
            image: self.image.clone(),
            entry_point: split_tokens(&self.entry_point),
            command: split_tokens(&self.command),
            execution_role_arn: Some(self.execution_role_arn.clone()),
            environment_files: vec![EnvFileRef {
                value: self.env_file.clone(),
                kind: EnvFileKind::S3,
            }],
            launch: LaunchKind::Ec2,
            region,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
