//! CLI command definitions and dispatch.

pub mod config;
pub mod export;
pub mod extract;
pub mod locate;
pub mod process;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::output::OutputFormat;
use mapkoord_core::config::AppConfig;
use mapkoord_core::error::AppError;
use mapkoord_service::Pipeline;

/// MapKoord: export GTA V map assets via CodeWalker and extract coordinates
#[derive(Debug, Parser)]
#[command(name = "mapkoord", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "MAPKOORD_CONFIG", default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export if needed, then extract and summarize coordinates
    Process(process::ProcessArgs),
    /// Make a map asset available as XML
    Export(export::ExportArgs),
    /// Extract coordinates from an XML document
    Extract(extract::ExtractArgs),
    /// Show which CodeWalker executable would be used
    Locate(locate::LocateArgs),
    /// Settings management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        debug!(command = ?self.command, config = %self.config, "Dispatching command");

        let result = match &self.command {
            Commands::Process(args) => process::execute(args, &config, self.format).await,
            Commands::Export(args) => export::execute(args, &config, self.format).await,
            Commands::Extract(args) => extract::execute(args, &config, self.format).await,
            Commands::Locate(args) => locate::execute(args, &config, self.format),
            Commands::Config(args) => config::execute(args, &config, self.format),
        };

        if let Err(e) = &result {
            debug!(kind = %e.kind, error = %e.message, "Command failed");
        }
        result
    }
}

/// Helper: pipeline wired from configuration and saved settings
pub fn build_pipeline(config: &AppConfig) -> Pipeline {
    Pipeline::from_config(config)
}
