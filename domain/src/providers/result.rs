//! Uniform provider result envelope

use crate::answer::{ParsedAnswer, extract_answer};
use serde::{Deserialize, Serialize};

/// Stable classification of a provider failure
///
/// The snake_case names are part of the external contract: they appear in
/// JSON output and the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// No API key configured for the provider
    MissingCredential,
    /// Rate limited or temporarily unavailable (429/503/529)
    Overload,
    /// The call exceeded its deadline
    Timeout,
    /// Credentials rejected (401/403)
    AuthError,
    /// Unknown model or endpoint (404)
    NotFound,
    /// The provider refused to answer on safety grounds
    SafetyBlocked,
    /// Connection-level failure
    NetworkError,
    /// The provider answered but no answer could be extracted
    EmptyOrUnparseable,
    /// Anything else
    Other,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::MissingCredential => "missing_credential",
            ProviderErrorKind::Overload => "overload",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::AuthError => "auth_error",
            ProviderErrorKind::NotFound => "not_found",
            ProviderErrorKind::SafetyBlocked => "safety_blocked",
            ProviderErrorKind::NetworkError => "network_error",
            ProviderErrorKind::EmptyOrUnparseable => "empty_or_unparseable",
            ProviderErrorKind::Other => "other",
        }
    }

    /// Classify an HTTP error status
    pub fn from_http_status(status: u16) -> Self {
        match status {
            429 | 503 | 529 => ProviderErrorKind::Overload,
            401 | 403 => ProviderErrorKind::AuthError,
            404 => ProviderErrorKind::NotFound,
            408 | 504 => ProviderErrorKind::Timeout,
            _ => ProviderErrorKind::Other,
        }
    }

    /// Whether another attempt may succeed.
    ///
    /// Credential, auth and not-found failures will not change on retry.
    /// A safety block is deterministic for the same prompt, so it is not
    /// retried either.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderErrorKind::Overload
                | ProviderErrorKind::Timeout
                | ProviderErrorKind::NetworkError
                | ProviderErrorKind::EmptyOrUnparseable
                | ProviderErrorKind::Other
        )
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one provider invocation, retries included
///
/// Exactly one is produced per dispatched call. Intermediate attempts are
/// never visible; `attempts` records how many were made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider_id: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ProviderErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub attempts: u32,
    pub latency_ms: u64,
}

impl ProviderResult {
    pub fn success(provider_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            succeeded: true,
            raw_text: Some(raw_text.into()),
            error_kind: None,
            error_detail: None,
            attempts: 1,
            latency_ms: 0,
        }
    }

    pub fn failure(
        provider_id: impl Into<String>,
        kind: ProviderErrorKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            succeeded: false,
            raw_text: None,
            error_kind: Some(kind),
            error_detail: Some(detail.into()),
            attempts: 1,
            latency_ms: 0,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Parsed answer; empty for failed results
    pub fn answer(&self) -> ParsedAnswer {
        match (&self.raw_text, self.succeeded) {
            (Some(text), true) => extract_answer(text),
            _ => ParsedAnswer::empty(),
        }
    }

    /// Short failure description for logs (e.g. `overload: HTTP 429`)
    pub fn failure_summary(&self) -> Option<String> {
        let kind = self.error_kind?;
        Some(match &self.error_detail {
            Some(detail) => format!("{}: {}", kind, detail),
            None => kind.to_string(),
        })
    }
}
