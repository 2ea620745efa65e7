//! Provider retry settings from TOML (`[retry]` section)
//!
//! ```toml
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 1000
//! overload_base_delay_ms = 4000
//! max_delay_ms = 30000
//! call_timeout_secs = 60
//! ```

use ensemble_application::RetryPolicy;
use ensemble_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Attempts per provider call, first one included
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Base delay after rate limiting or overload
    pub overload_base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Deadline for a single attempt
    pub call_timeout_secs: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            overload_base_delay_ms: policy.overload_base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            call_timeout_secs: policy.call_timeout.as_secs(),
        }
    }
}

impl FileRetryConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        if self.max_attempts == 0 {
            vec![ConfigIssue::error(
                ConfigIssueCode::ZeroAttempts,
                "retry.max_attempts: must be at least 1",
            )]
        } else {
            Vec::new()
        }
    }

    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            overload_base_delay: Duration::from_millis(self.overload_base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            call_timeout: Duration::from_secs(self.call_timeout_secs.max(1)),
        }
    }
}
