//! Answer cache settings from TOML (`[cache]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub enabled: bool,
    /// Entries older than this are treated as absent
    pub ttl_seconds: u64,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
        }
    }
}

impl FileCacheConfig {
    /// TTL when caching is on, `None` otherwise
    pub fn ttl(&self) -> Option<Duration> {
        (self.enabled && self.ttl_seconds > 0).then(|| Duration::from_secs(self.ttl_seconds))
    }
}
