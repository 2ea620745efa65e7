//! HTTP plumbing shared by the provider adapters

use ensemble_application::GatewayError;
use ensemble_domain::core::string::truncate;
use std::time::Duration;

/// Longest error body kept in a [`GatewayError::Http`] message
const MAX_ERROR_BODY: usize = 300;

/// Build the reqwest client used by one adapter.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::Other(format!("Failed to create HTTP client: {e}")))
}

/// Resolve an API key: the configured value wins over the environment.
///
/// Blank values count as absent.
pub fn resolve_api_key(direct: Option<&str>, env_var: &str) -> Option<String> {
    direct
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
}

/// Join a base URL and a path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Classify a transport-level failure.
pub fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_connect() || err.is_request() || err.is_body() {
        GatewayError::Network(err.to_string())
    } else if err.is_decode() {
        GatewayError::Other(format!("Invalid response body: {err}"))
    } else {
        GatewayError::Network(err.to_string())
    }
}

/// Turn a non-success response into [`GatewayError::Http`].
///
/// The status drives classification; the body is only kept as context.
pub async fn error_from_response(response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    GatewayError::Http {
        status,
        message: truncate(body.trim(), MAX_ERROR_BODY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.openai.com/", "/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(join_url("http://127.0.0.1:8080", "v1beta"), "http://127.0.0.1:8080/v1beta");
    }

    #[test]
    fn test_resolve_api_key_prefers_direct_value() {
        let key = resolve_api_key(Some("direct"), "EXAM_ENSEMBLE_TEST_UNSET_KEY");
        assert_eq!(key.as_deref(), Some("direct"));
    }

    #[test]
    fn test_resolve_api_key_blank_is_absent() {
        assert!(resolve_api_key(Some("  "), "EXAM_ENSEMBLE_TEST_UNSET_KEY").is_none());
        assert!(resolve_api_key(None, "EXAM_ENSEMBLE_TEST_UNSET_KEY").is_none());
    }
}
