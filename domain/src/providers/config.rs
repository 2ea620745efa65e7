//! Provider configuration types (provider-neutral, serde-free).
//!
//! These types define the shape of provider settings without depending
//! on any serialization format (TOML, JSON, etc.).

use std::collections::HashMap;

/// Top-level provider configuration.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Default provider name: "gemini" or "openai".
    pub default: Option<String>,
    /// Explicit model → provider routing overrides.
    pub routing: HashMap<String, String>,
    /// Google Gemini API settings.
    pub gemini: GeminiProviderConfig,
    /// OpenAI-compatible API settings.
    pub openai: OpenAiProviderConfig,
}

/// Google Gemini provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiProviderConfig {
    /// Environment variable holding the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    /// Direct API key; prefer the environment variable.
    pub api_key: Option<String>,
    /// Base URL for the Generative Language API.
    pub base_url: String,
}

impl Default for GeminiProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

/// OpenAI-compatible provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiProviderConfig {
    /// Environment variable holding the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key; prefer the environment variable.
    pub api_key: Option<String>,
    /// Base URL for the chat completions API.
    pub base_url: String,
}

impl Default for OpenAiProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
        }
    }
}
