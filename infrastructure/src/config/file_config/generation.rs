//! Sampling settings from TOML (`[generation]` section)

use ensemble_application::GenerationParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
        }
    }
}

impl FileGenerationConfig {
    pub fn to_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature.clamp(0.0, 2.0),
            max_output_tokens: self.max_output_tokens.max(1),
        }
    }
}
