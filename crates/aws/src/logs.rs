//! CloudWatch Logs client for container output.
//!
//! The one-off task's log group is created on demand with a short
//! retention; an existing group is left untouched, including its
//! retention policy. After the run stops, the latest events of the
//! run's stream are fetched for display.

use aws_config::SdkConfig;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;

/// Errors from the CloudWatch Logs layer.
#[derive(Debug, thiserror::Error)]
pub enum LogsApiError {
    /// The log group could not be created or its retention set.
    #[error("Log group setup failed: {0}")]
    GroupSetup(String),

    /// Log events could not be fetched.
    #[error("Log event fetch failed: {0}")]
    Fetch(String),
}

/// CloudWatch Logs client scoped to one-off task output.
pub struct LogsApi {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl LogsApi {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudwatchlogs::Client::new(config),
        }
    }

    /// Create the log group if absent and set its retention.
    ///
    /// An already-existing group is not an error and keeps whatever
    /// retention it has.
    pub async fn ensure_group(&self, group: &str, retention_days: i32) -> Result<(), LogsApiError> {
        match self
            .client
            .create_log_group()
            .log_group_name(group)
            .send()
            .await
        {
            Ok(_) => {
                self.client
                    .put_retention_policy()
                    .log_group_name(group)
                    .retention_in_days(retention_days)
                    .send()
                    .await
                    .map_err(|e| LogsApiError::GroupSetup(format!("{}", DisplayErrorContext(&e))))?;
                tracing::info!(group, retention_days, "Created log group");
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_already_exists_exception()) =>
            {
                tracing::debug!(group, "Log group already exists");
                Ok(())
            }
            Err(e) => Err(LogsApiError::GroupSetup(format!(
                "{}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    /// Fetch the latest captured lines of one run's log stream.
    ///
    /// Returns `None` when the stream does not exist, which happens
    /// when the container produced no output or never started.
    pub async fn fetch_output(
        &self,
        group: &str,
        stream: &str,
    ) -> Result<Option<Vec<String>>, LogsApiError> {
        match self
            .client
            .get_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .start_from_head(false)
            .send()
            .await
        {
            Ok(output) => Ok(Some(
                output
                    .events()
                    .iter()
                    .filter_map(|e| e.message().map(str::to_string))
                    .collect(),
            )),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                tracing::debug!(group, stream, "Log stream not found");
                Ok(None)
            }
            Err(e) => Err(LogsApiError::Fetch(format!("{}", DisplayErrorContext(&e)))),
        }
    }
}
