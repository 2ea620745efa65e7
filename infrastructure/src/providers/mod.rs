//! LLM provider adapters
//!
//! Each adapter speaks one provider's HTTP API and returns plain text or a
//! classified [`GatewayError`]. [`RoutingGateway`] picks the adapter for a
//! model and is what the application layer sees as its `LlmGateway`.

pub mod gemini;
pub mod http;
pub mod openai;
pub mod routing;

pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;
pub use routing::RoutingGateway;

use async_trait::async_trait;
use ensemble_application::{GatewayError, GenerationRequest};
use ensemble_domain::{Model, ProviderConfig};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;
    fn supports_model(&self, model: &Model) -> bool;
    async fn generate(
        &self,
        model: &Model,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError>;
}

/// Build the gateway with every known adapter, routed per `config`.
///
/// `request_timeout` is the HTTP client's own deadline; the Provider Client
/// enforces its per-call timeout on top of it.
pub fn build_routing_gateway(
    config: &ProviderConfig,
    request_timeout: Duration,
) -> Result<RoutingGateway, GatewayError> {
    let providers: Vec<Arc<dyn ProviderAdapter>> = vec![
        Arc::new(GeminiAdapter::new(&config.gemini, request_timeout)?),
        Arc::new(OpenAiAdapter::new(&config.openai, request_timeout)?),
    ];
    Ok(RoutingGateway::new(providers, config))
}
