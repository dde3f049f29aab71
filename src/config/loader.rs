//! Configuration loading
//!
//! Handles loading configuration from the config file and environment
//! variables according to precedence rules.

use super::{defaults, paths, schema::Config};
use crate::fanout::OutputFormat;
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers applied
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        let path = paths::root_config_path();
        let config = if path.exists() {
            Self::load_file(&path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::load_defaults()
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // An empty file is a valid, all-defaults config
        if contents.trim().is_empty() {
            return Ok(Self::load_defaults());
        }

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking values
    ///
    /// Fails on invalid YAML, invalid value types, a zero concurrency limit
    /// or an unknown default output format.
    pub fn validate() -> Result<()> {
        let config = Self::load().context("Failed to load configuration")?;
        Self::check(&config)
    }

    /// Check the values of an already loaded configuration
    pub fn check(config: &Config) -> Result<()> {
        if config.fanout.max_concurrency == 0 {
            return Err(anyhow::anyhow!("fanout.maxConcurrency must be at least 1"));
        }
        config
            .fanout
            .format
            .parse::<OutputFormat>()
            .context("fanout.format is invalid")?;
        if config.selector.command.trim().is_empty() {
            return Err(anyhow::anyhow!("selector.command must not be empty"));
        }
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        // KUBEPICK_SELECTOR override
        if let Ok(selector) = std::env::var("KUBEPICK_SELECTOR") {
            config.selector.command = selector;
        }

        // KUBEPICK_KUBECTL override
        if let Ok(kubectl) = std::env::var("KUBEPICK_KUBECTL") {
            config.kubectl = kubectl;
        }

        // KUBEPICK_MAX_CONCURRENCY override
        if let Ok(max) = std::env::var("KUBEPICK_MAX_CONCURRENCY") {
            if let Ok(val) = max.parse::<usize>() {
                config.fanout.max_concurrency = val;
            }
        }

        // KUBEPICK_DEFAULT_NAMESPACE override
        if let Ok(namespace) = std::env::var("KUBEPICK_DEFAULT_NAMESPACE") {
            config.default_namespace = namespace;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.selector.command, "fzf");
        assert_eq!(config.fanout.format, "raw");
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.fanout.max_concurrency = 2;
        config.selector.exact = true;
        ConfigLoader::save(&config, &path).unwrap();

        let loaded = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(ConfigLoader::load_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "fanout: [not, a, map]").unwrap();
        assert!(ConfigLoader::load_file(&path).is_err());
    }

    #[test]
    fn test_check_rejects_bad_values() {
        let mut config = Config::default();
        config.fanout.max_concurrency = 0;
        assert!(ConfigLoader::check(&config).is_err());

        let mut config = Config::default();
        config.fanout.format = "table".to_string();
        assert!(ConfigLoader::check(&config).is_err());

        assert!(ConfigLoader::check(&Config::default()).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // These variables are only read by this test.
        unsafe {
            std::env::set_var("KUBEPICK_SELECTOR", "sk");
            std::env::set_var("KUBEPICK_MAX_CONCURRENCY", "3");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());

        assert_eq!(config.selector.command, "sk");
        assert_eq!(config.fanout.max_concurrency, 3);

        // SAFETY: see above.
        unsafe {
            std::env::remove_var("KUBEPICK_SELECTOR");
            std::env::remove_var("KUBEPICK_MAX_CONCURRENCY");
        }
    }
}
