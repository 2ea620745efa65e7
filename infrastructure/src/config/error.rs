//! Configuration errors

use ensemble_domain::{ConfigIssue, DomainError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {}", join_issues(.issues))]
    Invalid { issues: Vec<ConfigIssue> },

    #[error(transparent)]
    Roster(#[from] DomainError),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
