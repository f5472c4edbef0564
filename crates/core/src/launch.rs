//! Launch-type rules for one-off runs.
//!
//! EC2 tasks need no network configuration; Fargate tasks must be
//! placed into a VPC, so subnets and security groups are required
//! before any network call is made.

use crate::error::CoreError;

/// Where the one-off task is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaunchKind {
    #[default]
    Ec2,
    Fargate,
}

/// awsvpc network configuration for a Fargate run.
///
/// All subnets and security groups must belong to the same VPC. A
/// public IP is never assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSelection {
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
}

/// Check that the network configuration matches the launch type.
///
/// Fargate requires a [`NetworkSelection`] with at least one subnet and
/// one security group; EC2 ignores it.
pub fn validate_network(
    launch: LaunchKind,
    network: Option<&NetworkSelection>,
) -> Result<(), CoreError> {
    if launch != LaunchKind::Fargate {
        return Ok(());
    }
    match network {
        Some(n) if !n.subnets.is_empty() && !n.security_groups.is_empty() => Ok(()),
        _ => Err(CoreError::Validation(
            "launch type FARGATE requires subnet IDs and security-group IDs".to_string(),
        )),
    }
}
