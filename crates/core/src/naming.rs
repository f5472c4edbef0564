//! Log group and stream naming for one-off tasks.
//!
//! The awslogs driver writes to stream `{prefix}/{container}/{task-id}`
//! inside the task's log group. Stream names are derived locally so the
//! final output can be fetched after the run stops; the stream itself
//! is created by the driver, never by this tool.

/// Stream prefix configured on the awslogs driver.
pub const LOG_STREAM_PREFIX: &str = "ecs";

/// Retention applied when the log group is first created, in days.
pub const LOG_RETENTION_DAYS: i32 = 7;

/// Log group that collects output for a one-off task family.
pub fn log_group_for_task(task_name: &str) -> String {
    format!("/ecs/{task_name}")
}

/// Opaque task ID, i.e. the last path segment of a task ARN.
pub fn task_id_from_arn(task_arn: &str) -> &str {
    task_arn.rsplit('/').next().unwrap_or(task_arn)
}

/// Stream the awslogs driver writes for one run of a container.
pub fn log_stream_for_run(container_name: &str, task_arn: &str) -> String {
    format!(
        "{LOG_STREAM_PREFIX}/{container_name}/{}",
        task_id_from_arn(task_arn)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_group_is_prefixed_with_ecs() {
        assert_eq!(log_group_for_task("db-migrations"), "/ecs/db-migrations");
    }

    #[test]
    fn task_id_is_last_arn_segment() {
        let arn = "arn:aws:ecs:us-east-1:123:task/myEcsCluster/9f6ad2f8aae44d0d";
        assert_eq!(task_id_from_arn(arn), "9f6ad2f8aae44d0d");
    }

    #[test]
    fn stream_name_joins_prefix_container_and_id() {
        let arn = "arn:aws:ecs:us-east-1:123:task/myEcsCluster/9f6ad2f8aae44d0d";
        assert_eq!(
            log_stream_for_run("db-migrations", arn),
            "ecs/db-migrations/9f6ad2f8aae44d0d"
        );
    }
}
