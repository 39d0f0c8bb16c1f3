use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::doh::DohConfig;
use crate::errors::DohConfigError;

/// Policy applied when parsing the configured DoH servers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Reject the whole configuration if any server is invalid or none is given.
    #[default]
    Strict,
    /// Keep the valid servers and drop the rest.
    Lax,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Strict => "strict",
            ParseMode::Lax => "lax",
        }
    }

    /// Parses `text` under this policy.
    pub fn parse(&self, text: &str) -> Result<DohConfig, DohConfigError> {
        match self {
            ParseMode::Strict => DohConfig::from_str_strict(text),
            ParseMode::Lax => Ok(DohConfig::from_str_lax(text)),
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ParseMode::Strict),
            "lax" => Ok(ParseMode::Lax),
            other => Err(format!("unknown parse mode '{other}' (expected strict or lax)")),
        }
    }
}

/// DoH server settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DohSettings {
    /// Parse policy (default: "strict")
    #[serde(default)]
    pub mode: ParseMode,

    /// Raw server configuration, either whitespace-separated templates or a
    /// JSON `{"servers": [...]}` document
    #[serde(default)]
    pub servers: String,
}

impl DohSettings {
    /// Parses `servers` under the configured mode.
    pub fn resolve(&self) -> Result<DohConfig, DohConfigError> {
        self.mode.parse(&self.servers)
    }
}
