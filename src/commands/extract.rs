//! Extraction-only command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use mapkoord_core::config::AppConfig;
use mapkoord_core::error::AppError;
use mapkoord_extract::{CoordinateExtractor, summarize};

/// Arguments for the extract command
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// XML document to read
    pub xml: PathBuf,
    /// List every coordinate and every skipped element
    #[arg(short, long)]
    pub list: bool,
}

/// Coordinate display row
#[derive(Debug, Serialize, Tabled)]
struct CoordinateRow {
    #[tabled(rename = "#")]
    index: usize,
    x: String,
    y: String,
    z: String,
}

/// Skipped element display row
#[derive(Debug, Serialize, Tabled)]
struct SkipRow {
    line: u32,
    element: String,
    reason: String,
}

/// Execute the extract command
pub async fn execute(
    args: &ExtractArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let extractor = CoordinateExtractor::new(&config.extract);
    let report = extractor.extract_report(&args.xml).await?;
    let summary = summarize(&report.coordinates);

    if format == OutputFormat::Json {
        output::print_json(&serde_json::json!({
            "xml_path": args.xml,
            "summary": summary,
            "coordinates": report.coordinates,
            "skipped": report.skipped,
            "duplicates": report.duplicates,
        }));
        return Ok(());
    }

    println!("{}", summary);

    if args.list {
        let rows: Vec<CoordinateRow> = report
            .coordinates
            .iter()
            .enumerate()
            .map(|(i, p)| CoordinateRow {
                index: i + 1,
                x: format!("{:.4}", p.x),
                y: format!("{:.4}", p.y),
                z: format!("{:.4}", p.z),
            })
            .collect();
        if !rows.is_empty() {
            println!();
            output::print_list(&rows, format);
        }

        let skips: Vec<SkipRow> = report
            .skipped
            .iter()
            .map(|s| SkipRow {
                line: s.line,
                element: s.element.clone(),
                reason: s.reason.to_string(),
            })
            .collect();
        if !skips.is_empty() {
            println!();
            output::print_list(&skips, format);
        }
    } else if !report.skipped.is_empty() {
        output::print_warning(&format!(
            "{} position element(s) skipped; use --list for details",
            report.skipped.len()
        ));
    }

    Ok(())
}
