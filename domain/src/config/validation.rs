//! Structured configuration issues.
//!
//! Configuration is checked as a whole before any provider is called.
//! Problems are reported as [`ConfigIssue`]s with a severity, so callers can
//! refuse to start on errors and merely log warnings.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// No worker models configured.
    EmptyRoster,
    /// A model name is empty or whitespace.
    EmptyModelName,
    /// The same worker appears twice in the roster.
    DuplicateWorker,
    /// The judge is also a worker, so its arbitration is not independent.
    JudgeIsWorker,
    /// The primary fallback model is not a worker.
    PrimaryNotWorker,
    /// The secondary fallback model is not a worker.
    SecondaryNotWorker,
    /// `max_attempts` is zero; no provider would ever be called.
    ZeroAttempts,
    /// Unknown resolution mode string.
    UnknownMode,
    /// Unknown agreement rule string.
    UnknownRule,
    /// The agreement rule can never be met by the worker roster.
    UnreachableRule,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
