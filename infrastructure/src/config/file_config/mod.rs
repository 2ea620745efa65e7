//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Strings that name domain values (models, mode, rule) stay strings here so
//! that a bad value becomes a [`ConfigIssue`] instead of a parse failure.

mod cache;
mod ensemble;
mod generation;
mod logging;
mod output;
mod providers;
mod retry;

pub use cache::FileCacheConfig;
pub use ensemble::{FileEnsembleConfig, FileReliabilityConfig};
pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use providers::{FileGeminiConfig, FileOpenAiConfig, FileProvidersConfig};
pub use retry::FileRetryConfig;

use super::ConfigError;
use ensemble_application::{GenerationParams, ResolutionParams, RetryPolicy};
use ensemble_domain::{ConfigIssue, Model, ProviderConfig, ProviderRoster};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Roster, agreement rule, fallback order and mode
    pub ensemble: FileEnsembleConfig,
    /// Per-call retry bounds
    pub retry: FileRetryConfig,
    /// Sampling settings sent to every provider
    pub generation: FileGenerationConfig,
    /// Answer cache settings
    pub cache: FileCacheConfig,
    /// Provider endpoints, credentials and routing
    pub providers: FileProvidersConfig,
    /// Audit log and tracing file destinations
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Nothing here touches the network; an error-severity issue means the
    /// ensemble cannot run as configured.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.ensemble.validate();
        issues.extend(self.retry.validate());
        issues
    }

    /// Replace the worker roster and/or judge (CLI overrides)
    pub fn with_roster_override(mut self, workers: &[String], judge: Option<&str>) -> Self {
        if !workers.is_empty() {
            self.ensemble.workers = workers.to_vec();
        }
        if let Some(judge) = judge {
            self.ensemble.judge = judge.to_string();
        }
        self
    }

    /// Build the provider roster, refusing configurations with errors
    pub fn to_roster(&self) -> Result<ProviderRoster, ConfigError> {
        let errors: Vec<ConfigIssue> = self
            .validate()
            .into_iter()
            .filter(ConfigIssue::is_error)
            .collect();
        if !errors.is_empty() {
            return Err(ConfigError::Invalid { issues: errors });
        }

        let workers = self.ensemble.parse_workers().0;
        let judge = self
            .ensemble
            .parse_judge()
            .0
            .unwrap_or_else(Model::default_judge);
        Ok(ProviderRoster::new(workers, judge)?)
    }

    pub fn to_resolution_params(&self) -> ResolutionParams {
        ResolutionParams::default()
            .with_rule(self.ensemble.parse_rule().0)
            .with_reliability(self.ensemble.reliability.to_policy())
            .with_primary(self.ensemble.parse_primary().0)
            .with_secondary(self.ensemble.parse_secondary().0)
            .with_mode(self.ensemble.parse_mode().0)
            .with_single_min_confidence(self.ensemble.single_min_confidence.min(100))
    }

    pub fn to_retry_policy(&self) -> RetryPolicy {
        self.retry.to_policy()
    }

    pub fn to_generation_params(&self) -> GenerationParams {
        self.generation.to_params()
    }

    pub fn to_provider_config(&self) -> ProviderConfig {
        self.providers.to_provider_config()
    }
}
