use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::doh::{DohSettings, ParseMode};
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use crate::doh::DohConfig;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub doh: DohSettings,
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub mode: Option<ParseMode>,
    pub servers: Option<String>,
}

impl Config {
    /// Loads the config file at `config_path` (defaults when `None`) and
    /// applies `cli_overrides`.
    pub fn load(
        config_path: Option<&str>,
        cli_overrides: CliOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Read config file");
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(mode) = overrides.mode {
            self.doh.mode = mode;
        }
        if let Some(servers) = overrides.servers {
            self.doh.servers = servers;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LoggingConfig::is_valid_level(&self.logging.level) {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Parses the configured DoH servers under the configured mode.
    pub fn doh_config(&self) -> Result<DohConfig, ConfigError> {
        Ok(self.doh.resolve()?)
    }
}
