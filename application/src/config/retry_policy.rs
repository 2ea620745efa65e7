//! Retry policy for provider calls.
//!
//! [`RetryPolicy`] bounds the Provider Client state machine: how many
//! attempts, how long each may take, and how long to wait between them.

use ensemble_domain::ProviderErrorKind;
use std::time::Duration;

/// Highest power of two applied to a base delay
const MAX_BACKOFF_EXPONENT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per provider call, first one included (≥ 1)
    pub max_attempts: u32,
    /// Base delay for generic retryable failures
    pub base_delay: Duration,
    /// Base delay after rate limiting or overload
    pub overload_base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Deadline for one attempt
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            overload_base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(30),
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately (for tests)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            overload_base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based).
    ///
    /// `base × 2^(attempt-1)`, capped at `max_delay`; overload failures use
    /// the longer `overload_base_delay`.
    pub fn backoff_delay(&self, attempt: u32, kind: ProviderErrorKind) -> Duration {
        let base = if kind == ProviderErrorKind::Overload {
            self.overload_base_delay
        } else {
            self.base_delay
        };
        let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        base.saturating_mul(1 << exponent).min(self.max_delay)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}
