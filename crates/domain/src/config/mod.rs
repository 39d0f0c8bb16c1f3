//! Configuration module for the DoH config tool
//!
//! - `root`: Main configuration and CLI overrides
//! - `doh`: DoH server text and parse mode
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod doh;
pub mod errors;
pub mod logging;
pub mod root;

pub use doh::{DohSettings, ParseMode};
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
