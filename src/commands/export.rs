//! Export-only command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use mapkoord_core::config::AppConfig;
use mapkoord_core::error::AppError;
use mapkoord_export::AttemptRecord;

/// Arguments for the export command
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// XML document or binary map asset (.ymap)
    pub file: PathBuf,
    /// Path to CodeWalker.exe (or its folder) for this run
    #[arg(short, long)]
    pub tool: Option<PathBuf>,
}

/// Attempt display row
#[derive(Debug, Serialize, Tabled)]
struct AttemptRow {
    /// Order
    #[tabled(rename = "#")]
    index: usize,
    /// Convention label
    convention: String,
    /// Outcome
    outcome: String,
    /// Exit code
    exit: String,
    /// Duration
    elapsed: String,
}

impl AttemptRow {
    fn rows(attempts: &[AttemptRecord]) -> Vec<Self> {
        attempts
            .iter()
            .enumerate()
            .map(|(i, a)| Self {
                index: i + 1,
                convention: a.convention.clone(),
                outcome: if a.terminated {
                    format!("{} (terminated)", a.outcome)
                } else {
                    a.outcome.to_string()
                },
                exit: a.exit_code.map_or_else(|| "-".to_string(), |c| c.to_string()),
                elapsed: format!("{} ms", a.elapsed_ms),
            })
            .collect()
    }
}

/// Execute the export command
pub async fn execute(
    args: &ExportArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pipeline = super::build_pipeline(config);
    let hint = pipeline.tool_hint(args.tool.as_deref());

    match pipeline.orchestrator().ensure_xml(&args.file, hint).await {
        Ok(xml) => {
            if format == OutputFormat::Json {
                output::print_json(&xml);
                return Ok(());
            }
            output::print_success(&xml.provenance.message());
            output::print_kv("XML", &xml.path.display().to_string());
            if !xml.attempts.is_empty() {
                println!();
                output::print_list(&AttemptRow::rows(&xml.attempts), format);
            }
            Ok(())
        }
        Err(e) => {
            if !e.attempts().is_empty() {
                output::print_list(&AttemptRow::rows(e.attempts()), format);
            }
            Err(e.into())
        }
    }
}
