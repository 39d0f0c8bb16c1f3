pub mod config;
pub mod logging;

pub use config::{load_config, read_input};
pub use logging::init_logging;
