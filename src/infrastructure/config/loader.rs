use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid github.requests_per_hour: {0}. Must be at least 1")]
    InvalidRequestRate(u32),

    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .gh-sync/config.yaml (project config)
    /// 3. .gh-sync/local.yaml (project local overrides, optional)
    /// 4. `extra`, a file named on the command line
    /// 5. `ADO_URL`, `ADO_PROJECT`, `ADO_AREA_PATH`
    /// 6. Environment variables (`GH_SYNC_*` prefix, highest priority)
    pub fn load(extra: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".gh-sync/config.yaml"))
            .merge(Yaml::file(".gh-sync/local.yaml"));
        if let Some(path) = extra {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .merge(Self::legacy_env())
            .merge(Env::prefixed("GH_SYNC_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Unprefixed variables for the Azure DevOps target.
    fn legacy_env() -> Env {
        Env::raw()
            .only(&["ADO_URL", "ADO_PROJECT", "ADO_AREA_PATH"])
            .map(|key| {
                if key == "ADO_URL" {
                    "ado.collection_uri".into()
                } else if key == "ADO_PROJECT" {
                    "ado.project".into()
                } else {
                    "ado.area_path".into()
                }
            })
            .split(".")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.github.requests_per_hour == 0 {
            return Err(ConfigError::InvalidRequestRate(config.github.requests_per_hour));
        }

        if config.github.tracking_label.trim().is_empty() {
            return Err(ConfigError::MissingSetting("github.tracking_label"));
        }

        if config.ado.collection_uri.trim().is_empty() {
            return Err(ConfigError::MissingSetting("ado.collection_uri"));
        }
        if config.ado.project.trim().is_empty() {
            return Err(ConfigError::MissingSetting("ado.project"));
        }
        if config.ado.area_path.trim().is_empty() {
            return Err(ConfigError::MissingSetting("ado.area_path"));
        }

        if !config.ado.collection_uri.starts_with("http://")
            && !config.ado.collection_uri.starts_with("https://")
        {
            return Err(ConfigError::ValidationFailed(format!(
                "ado.collection_uri must be an http(s) URL, got '{}'",
                config.ado.collection_uri
            )));
        }

        Ok(())
    }
}
