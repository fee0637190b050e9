//! Full pipeline command.

use std::path::PathBuf;

use clap::Args;

use crate::output::{self, OutputFormat};
use mapkoord_core::config::AppConfig;
use mapkoord_core::error::AppError;
use mapkoord_service::PipelineRequest;

/// Arguments for the process command
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// XML document or binary map asset (.ymap)
    pub file: PathBuf,
    /// Path to CodeWalker.exe (or its folder) for this run
    #[arg(short, long)]
    pub tool: Option<PathBuf>,
}

/// Execute the process command
pub async fn execute(
    args: &ProcessArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pipeline = super::build_pipeline(config);
    let request = PipelineRequest::new(&args.file).with_tool_hint(args.tool.clone());

    let report = pipeline.process(&request).await?;
    output::print_report(&report, format);

    if format == OutputFormat::Table && !report.skipped.is_empty() {
        output::print_warning(&format!(
            "{} position element(s) skipped; run `mapkoord extract {} --list` for details",
            report.skipped.len(),
            report.xml_path.display()
        ));
    }

    Ok(())
}
