// src/config/loader.rs
//! Layered configuration loading
//!
//! Defaults are serialized into a TOML table, every existing configuration
//! file is merged over it in order, and `SSVEP_` environment variables are
//! applied last (`SSVEP_ANALYSIS__NUM_HARMONICS=3` sets
//! `analysis.num_harmonics`). The merged table is then deserialized and
//! checked with [`SsvepConfig::validate_consistency`].

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use crate::config::{constants::paths, SsvepConfig};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Configuration loader merging files and environment overrides
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader over the default discovery paths
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Loader over custom paths, later paths taking precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> Result<SsvepConfig, ConfigError> {
        let mut merged = defaults_table()?;

        for config_path in &self.config_paths {
            match load_config_file(config_path) {
                Ok(file_config) => {
                    debug!(path = %config_path.display(), "merging configuration file");
                    merge_toml_values(&mut merged, file_config);
                }
                // Missing files are optional layers
                Err(ConfigError::FileNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        self.apply_environment_overrides(&mut merged);

        let config = finish(merged)?;
        info!(
            sampling_rate_hz = config.analysis.sampling_rate_hz,
            frequencies = config.analysis.stimulus_frequencies_hz.len(),
            num_harmonics = config.analysis.num_harmonics,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load a single file over the defaults, without environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SsvepConfig, ConfigError> {
        let mut merged = defaults_table()?;
        merge_toml_values(&mut merged, load_config_file(path.as_ref())?);
        finish(merged)
    }

    /// Parse a TOML document over the defaults
    pub fn from_toml_str(content: &str) -> Result<SsvepConfig, ConfigError> {
        let mut merged = defaults_table()?;
        merge_toml_values(&mut merged, toml::from_str(content)?);
        finish(merged)
    }

    /// Serialize a configuration as pretty TOML
    pub fn to_toml_string(config: &SsvepConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Write a configuration to `path`
    pub fn export_config<P: AsRef<Path>>(config: &SsvepConfig, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, Self::to_toml_string(config)?)?;
        Ok(())
    }

    fn apply_environment_overrides(&self, config: &mut toml::Value) {
        for (key, value) in std::env::vars() {
            let Some(stripped) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };
            let config_path: Vec<String> = stripped
                .to_lowercase()
                .split(paths::ENV_SEPARATOR)
                .map(str::to_string)
                .collect();

            debug!(variable = %key, "applying environment override");
            set_nested_value(config, &config_path, parse_env_value(&value));
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ]
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn defaults_table() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SsvepConfig::default()).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn finish(merged: toml::Value) -> Result<SsvepConfig, ConfigError> {
    let config: SsvepConfig = merged
        .try_into()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    config
        .validate_consistency()
        .map_err(ConfigError::ValidationError)?;

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

/// Interpret an environment value as a TOML literal (numbers, booleans,
/// arrays), falling back to a plain string
fn parse_env_value(value: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {}", value))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(value.to_string()))
}

fn set_nested_value(config: &mut toml::Value, path: &[String], value: toml::Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = config;
    for part in parents {
        let toml::Value::Table(table) = current else {
            return;
        };
        current = table
            .entry(part.clone())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    }

    if let toml::Value::Table(table) = current {
        table.insert(last.clone(), value);
    }
}
