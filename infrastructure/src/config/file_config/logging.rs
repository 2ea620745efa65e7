//! Log destinations from TOML (`[logging]` section)
//!
//! ```toml
//! [logging]
//! audit_path = "~/.local/share/exam-ensemble/resolutions.jsonl"
//! dir = "~/.local/share/exam-ensemble/logs"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL resolution audit log; disabled when unset
    pub audit_path: Option<PathBuf>,
    /// Directory for daily-rolling tracing logs; disabled when unset
    pub dir: Option<PathBuf>,
}

impl FileLoggingConfig {
    pub fn audit_path(&self) -> Option<PathBuf> {
        self.audit_path.as_deref().map(expand_home)
    }

    pub fn dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_home)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &std::path::Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let config = FileLoggingConfig {
            audit_path: Some(PathBuf::from("~/audit.jsonl")),
            dir: Some(PathBuf::from("/var/log/ensemble")),
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.audit_path(), Some(home.join("audit.jsonl")));
        }
        assert_eq!(config.dir(), Some(PathBuf::from("/var/log/ensemble")));
        assert_eq!(FileLoggingConfig::default().audit_path(), None);
    }
}
