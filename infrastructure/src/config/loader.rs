//! Configuration file loader with multi-source merging

use super::error::ConfigError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "exam-ensemble";
const PROJECT_FILES: [&str; 2] = ["ensemble.toml", ".ensemble.toml"];
const ENV_PREFIX: &str = "EXAM_ENSEMBLE_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `EXAM_ENSEMBLE_*` environment variables, e.g.
    ///    `EXAM_ENSEMBLE_RETRY__MAX_ATTEMPTS=5`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./ensemble.toml` or `./.ensemble.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/exam-ensemble/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        Ok(Self::figment(config_path).extract().map_err(Box::new)?)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(project_path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&project_path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for `--show-config`)
    pub fn describe_sources(config_path: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] {}*", ENV_PREFIX));

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            lines.push(format!("  [{:5}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push(format!(
                "  [     ] Project: ./{} or ./{}",
                PROJECT_FILES[0], PROJECT_FILES[1]
            )),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.ensemble.workers.len(), 3);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_global_config_path_names_app() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.to_string_lossy().contains("exam-ensemble"));
        }
    }

    #[test]
    fn test_project_file_is_merged_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ensemble.toml",
                r#"
[ensemble]
judge = "gpt-4.1"

[cache]
ttl_seconds = 60
"#,
            )?;

            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config.ensemble.judge, "gpt-4.1");
            assert_eq!(config.cache.ttl_seconds, 60);
            // Untouched sections keep their defaults
            assert_eq!(config.ensemble.workers.len(), 3);
            assert_eq!(config.retry.max_attempts, 3);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file("ensemble.toml", "[retry]\nmax_attempts = 2\n")?;
            jail.create_file("custom.toml", "[retry]\nmax_attempts = 7\n")?;

            let config = ConfigLoader::load(Some(Path::new("custom.toml"))).unwrap();
            assert_eq!(config.retry.max_attempts, 7);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file("ensemble.toml", "[retry]\nmax_attempts = 2\n")?;
            jail.set_env("EXAM_ENSEMBLE_RETRY__MAX_ATTEMPTS", "4");
            jail.set_env("EXAM_ENSEMBLE_ENSEMBLE__MODE", "single");

            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config.retry.max_attempts, 4);
            assert_eq!(config.ensemble.mode, "single");
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("ensemble.toml", "[retry]\nmax_attempts = \"many\"\n")?;

            let result = ConfigLoader::load(None);
            assert!(matches!(result, Err(ConfigError::Load(_))));
            Ok(())
        });
    }
}
