//! Tool discovery command.

use std::path::PathBuf;

use clap::Args;

use crate::output::{self, OutputFormat};
use mapkoord_core::config::AppConfig;
use mapkoord_core::error::AppError;

/// Arguments for the locate command
#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Path to CodeWalker.exe (or its folder) to check first
    #[arg(short, long)]
    pub tool: Option<PathBuf>,
}

/// Execute the locate command
pub fn execute(args: &LocateArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let pipeline = super::build_pipeline(config);
    let tool = pipeline.locate(args.tool.as_deref())?;

    match format {
        OutputFormat::Json => output::print_json(&tool),
        OutputFormat::Table => {
            output::print_success("CodeWalker found");
            output::print_kv("Executable", &tool.executable.display().to_string());
            output::print_kv("Working directory", &tool.working_dir.display().to_string());
            output::print_kv("Found via", &format!("{:?}", tool.discovery_method));
        }
    }
    Ok(())
}
