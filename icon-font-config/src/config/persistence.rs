//! Config persistence: YAML load/save with atomic write.

use super::Config;
use super::env_vars::substitute_variables;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from `path`, or return defaults if it does not exist.
    ///
    /// The raw YAML goes through `${VAR}` substitution before parsing.
    /// The result is not validated; call [`Config::validate`] before use.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let contents = substitute_variables(contents);
        let config: Config = serde_yaml_ng::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::from)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        log::info!("Config written to {:?}", path);
        Ok(())
    }
}
