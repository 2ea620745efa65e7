//! Provider configuration from TOML (`[providers]` section)
//!
//! ```toml
//! [providers]
//! default = "gemini"
//!
//! [providers.routing]
//! "gpt-4o" = "openai"
//!
//! [providers.gemini]
//! api_key_env = "GEMINI_API_KEY"
//!
//! [providers.openai]
//! base_url = "https://api.openai.com"
//! ```

use ensemble_domain::{GeminiProviderConfig, OpenAiProviderConfig, ProviderConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Google Gemini API provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    /// Direct API key; the environment variable is preferred.
    pub api_key: Option<String>,
    /// Base URL for the Generative Language API.
    pub base_url: String,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        let defaults = GeminiProviderConfig::default();
        Self {
            api_key_env: defaults.api_key_env,
            api_key: None,
            base_url: defaults.base_url,
        }
    }
}

/// OpenAI-compatible API provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key; the environment variable is preferred.
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API (can point at any compatible server).
    pub base_url: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        let defaults = OpenAiProviderConfig::default();
        Self {
            api_key_env: defaults.api_key_env,
            api_key: None,
            base_url: defaults.base_url,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Default provider: "gemini" or "openai".
    pub default: Option<String>,
    /// Explicit model → provider routing overrides.
    pub routing: HashMap<String, String>,
    pub gemini: FileGeminiConfig,
    pub openai: FileOpenAiConfig,
}

impl FileProvidersConfig {
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            default: self.default.clone(),
            routing: self.routing.clone(),
            gemini: GeminiProviderConfig {
                api_key_env: self.gemini.api_key_env.clone(),
                api_key: self.gemini.api_key.clone(),
                base_url: self.gemini.base_url.clone(),
            },
            openai: OpenAiProviderConfig {
                api_key_env: self.openai.api_key_env.clone(),
                api_key: self.openai.api_key.clone(),
                base_url: self.openai.base_url.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_providers_deserialize() {
        let toml_str = r#"
[providers]
default = "openai"

[providers.routing]
"gemini-2.5-pro" = "gemini"

[providers.openai]
base_url = "http://localhost:8080"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let providers = config.providers.to_provider_config();
        assert_eq!(providers.default.as_deref(), Some("openai"));
        assert_eq!(providers.routing.get("gemini-2.5-pro").map(String::as_str), Some("gemini"));
        assert_eq!(providers.openai.base_url, "http://localhost:8080");
        assert_eq!(providers.openai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(providers.gemini, GeminiProviderConfig::default());
    }
}
