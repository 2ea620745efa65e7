//! Configuration file loading for exam-ensemble
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `EXAM_ENSEMBLE_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./ensemble.toml` or `./.ensemble.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/exam-ensemble/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod loader;

pub use error::ConfigError;
pub use file_config::{
    FileCacheConfig, FileConfig, FileEnsembleConfig, FileGenerationConfig, FileGeminiConfig,
    FileLoggingConfig, FileOpenAiConfig, FileOutputConfig, FileProvidersConfig,
    FileReliabilityConfig, FileRetryConfig,
};
pub use loader::ConfigLoader;
