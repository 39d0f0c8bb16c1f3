//! # DoH Config
//!
//! Checks and normalizes DNS-over-HTTPS server configuration

mod bootstrap;

use clap::{Parser, Subcommand};
use doh_config_domain::{CliOverrides, DohConfig, ParseMode};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "doh-config")]
#[command(version)]
#[command(about = "Check and normalize DNS-over-HTTPS server configuration")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short = 'c', long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<String>,

    /// Keep valid servers and drop invalid ones instead of rejecting the input
    #[arg(long, global = true)]
    lax: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse the servers and report how many are usable
    Check {
        /// File with the servers, or `-` for stdin; defaults to the config file
        input: Option<String>,
    },
    /// Print the canonical text form
    Format { input: Option<String> },
    /// Print the JSON form
    Json { input: Option<String> },
}

impl Command {
    fn input(&self) -> Option<&str> {
        match self {
            Command::Check { input } | Command::Format { input } | Command::Json { input } => {
                input.as_deref()
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let servers = cli.command.input().map(bootstrap::read_input).transpose()?;
    let overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        mode: cli.lax.then_some(ParseMode::Lax),
        servers,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        mode = %config.doh.mode,
        "Configuration loaded"
    );

    let doh = config.doh_config()?;

    match cli.command {
        Command::Check { .. } => check(&doh, config.doh.mode),
        Command::Format { .. } => {
            println!("{doh}");
            Ok(())
        }
        Command::Json { .. } => {
            println!("{}", serde_json::to_string_pretty(&doh.to_value())?);
            Ok(())
        }
    }
}

fn check(doh: &DohConfig, mode: ParseMode) -> anyhow::Result<()> {
    if doh.is_empty() {
        warn!(%mode, "No usable DoH servers");
        anyhow::bail!("no usable DoH servers");
    }

    for server in doh {
        let method = if server.use_post() { "POST" } else { "GET" };
        info!(
            template = server.server_template(),
            method,
            endpoints = server.endpoints().len(),
            "DoH server"
        );
    }
    println!("ok: {} server(s), mode {mode}", doh.len());
    Ok(())
}
