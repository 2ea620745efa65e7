//! LLM Gateway port
//!
//! Defines the interface for sending one prompt to one provider. Each
//! provider's response shape is normalized to plain text (or a classified
//! error) behind this port, so nothing above it branches on providers.

use async_trait::async_trait;
use ensemble_domain::{Model, ProviderErrorKind, QuestionImage, RenderedPrompt};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Blocked by safety filter: {0}")]
    SafetyBlocked(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Stable classification of this error
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            GatewayError::MissingCredential(_) => ProviderErrorKind::MissingCredential,
            GatewayError::Http { status, .. } => ProviderErrorKind::from_http_status(*status),
            GatewayError::Timeout => ProviderErrorKind::Timeout,
            GatewayError::Network(_) => ProviderErrorKind::NetworkError,
            GatewayError::SafetyBlocked(_) => ProviderErrorKind::SafetyBlocked,
            GatewayError::EmptyResponse => ProviderErrorKind::EmptyOrUnparseable,
            GatewayError::ModelNotAvailable(_) => ProviderErrorKind::NotFound,
            GatewayError::Other(_) => ProviderErrorKind::Other,
        }
    }
}

/// One generation request: the shared prompt plus sampling settings
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: RenderedPrompt,
    pub image: Option<QuestionImage>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send the request to `model` and return the raw response text
    async fn generate(
        &self,
        model: &Model,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError>;
}
