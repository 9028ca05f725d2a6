//! Command line entry points
//!
//! - `ask`: answer one question and print the result
//! - `serve`: run the HTTP API

pub mod ask;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Corrective retrieval question answering over legal texts
#[derive(Parser)]
#[command(name = "legal-crag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over config/default and config/local
    #[arg(long, short, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a single question
    Ask(ask::AskArgs),

    /// Run the HTTP API server
    Serve,
}

/// Load `.env`, configuration and logging shared by every command
pub fn bootstrap(config_file: Option<&str>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load_from(config_file)?;
    init_logging(&config.logging);

    Ok(config)
}
