use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use ensemble_application::{GatewayError, GenerationRequest, LlmGateway};
use ensemble_domain::{Model, ProviderConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RoutingGateway {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    /// Model name to provider index, from `[providers.routing]`
    explicit_model_routing: HashMap<String, usize>,
    default_kind: ProviderKind,
}

impl RoutingGateway {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>, config: &ProviderConfig) -> Self {
        let mut explicit_model_routing = HashMap::new();

        for (model_name, provider_name) in &config.routing {
            let Some(target_kind) = ProviderKind::from_name(provider_name) else {
                warn!(
                    "Ignoring routing for {}: unknown provider '{}'",
                    model_name, provider_name
                );
                continue;
            };

            if let Some(idx) = providers.iter().position(|p| p.kind() == target_kind) {
                explicit_model_routing.insert(model_name.clone(), idx);
            }
        }

        let default_kind = config
            .default
            .as_deref()
            .and_then(ProviderKind::from_name)
            .unwrap_or_default();

        Self {
            providers,
            explicit_model_routing,
            default_kind,
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Pick the adapter for `model`.
    ///
    /// Priority:
    ///  1. explicit routing entry for the model name
    ///  2. the first adapter whose model family matches
    ///  3. the configured default provider
    ///  4. the first registered adapter
    ///  5. `ModelNotAvailable` when no adapter is registered
    fn resolve_provider(&self, model: &Model) -> Result<&dyn ProviderAdapter, GatewayError> {
        if let Some(&idx) = self.explicit_model_routing.get(model.as_str()) {
            return Ok(self.providers[idx].as_ref());
        }

        if let Some(p) = self.providers.iter().find(|p| p.supports_model(model)) {
            return Ok(p.as_ref());
        }

        if let Some(p) = self
            .providers
            .iter()
            .find(|p| p.kind() == self.default_kind)
        {
            return Ok(p.as_ref());
        }

        self.providers
            .first()
            .map(|p| p.as_ref())
            .ok_or_else(|| GatewayError::ModelNotAvailable(model.to_string()))
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn generate(
        &self,
        model: &Model,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError> {
        let provider = self.resolve_provider(model)?;
        debug!("Routing {} to {}", model, provider.kind());
        provider.generate(model, request).await
    }
}
