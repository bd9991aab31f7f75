// File: src/config.rs
// Purpose: Regex guard limits, loadable from TOML

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default cap on input length for pattern matching
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 10_000;

/// Default budget for an async pattern match, in milliseconds
pub const DEFAULT_REGEX_TIMEOUT_MS: u64 = 1_000;

/// Limits applied by pattern rules
///
/// ```toml
/// [validation]
/// max_input_length = 5000
/// regex_timeout_ms = 250
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,

    #[serde(default = "default_regex_timeout_ms")]
    pub regex_timeout_ms: u64,
}

fn default_max_input_length() -> usize {
    DEFAULT_MAX_INPUT_LENGTH
}

fn default_regex_timeout_ms() -> u64 {
    DEFAULT_REGEX_TIMEOUT_MS
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_input_length: default_max_input_length(),
            regex_timeout_ms: default_regex_timeout_ms(),
        }
    }
}

impl GuardConfig {
    pub fn regex_timeout(&self) -> Duration {
        Duration::from_millis(self.regex_timeout_ms)
    }

    /// Parse from TOML, reading the `[validation]` table when present and the
    /// document root otherwise
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)?;
        let section = match table.remove("validation") {
            Some(toml::Value::Table(section)) => section,
            _ => table,
        };
        let config: GuardConfig = toml::Value::Table(section).try_into()?;
        config.check()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(?config, path = %path.display(), "Loaded guard config");
        Ok(config)
    }

    fn check(&self) -> std::result::Result<(), ConfigError> {
        if self.max_input_length == 0 {
            return Err(ConfigError::InvalidValue(
                "max_input_length must be greater than 0".to_string(),
            ));
        }
        if self.regex_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "regex_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
