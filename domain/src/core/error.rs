//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No worker models configured")]
    NoWorkers,

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(DomainError::NoWorkers.to_string(), "No worker models configured");
        assert_eq!(
            DomainError::InvalidRoster("judge missing".to_string()).to_string(),
            "Invalid roster: judge missing"
        );
    }
}
