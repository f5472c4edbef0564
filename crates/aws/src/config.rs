//! AWS client configuration.
//!
//! Profile and region selection is carried as an explicit value into
//! the SDK config loader; nothing is read from ambient global state
//! beyond what the SDK's default provider chain already consults
//! (environment, shared config files, instance metadata).

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Caller-selected AWS profile and region.
///
/// Either field may be absent, in which case the SDK's default
/// resolution order applies.
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl AwsSettings {
    /// Resolve the shared SDK configuration for these settings.
    pub async fn load(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }
}

/// Region the SDK resolved, as written into the awslogs driver options.
pub fn resolved_region(config: &SdkConfig) -> Option<String> {
    config.region().map(|r| r.to_string())
}
