//! DNS-over-HTTPS server configuration.
//!
//! - `template`: URI template checking
//! - `server`: a single validated DoH server
//! - `config`: an ordered group of servers and its text syntaxes

pub mod config;
pub mod server;
mod template;

pub use config::DohConfig;
pub use server::{DohEndpoint, DohServer};
