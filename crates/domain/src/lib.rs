//! DoH Config Domain Layer
pub mod config;
pub mod doh;
pub mod errors;

pub use config::{CliOverrides, Config, ConfigError, DohSettings, LoggingConfig, ParseMode};
pub use doh::{DohConfig, DohEndpoint, DohServer};
pub use errors::DohConfigError;
