//! Export orchestration: pass-through, tool resolution, and the sequential
//! attempt loop over argument conventions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mapkoord_core::config::export::{ArgConvention, ExportConfig, OutputLocation};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::attempt::{AttemptOutcome, AttemptRecord, tail_chars};
use crate::convention::{self, build_invocation};
use crate::error::ExportError;
use crate::locator::{TOOL_ENV_VAR, ToolInstallation, ToolLocator};
use crate::runner::{HiddenProcessRunner, OutputWatch, RunOutcome, RunStatus, SilentRunner};
use crate::source::{SourceAsset, sniff_file};

/// Lower-cased fragments that mark a rejected command line.
const USAGE_MARKERS: &[&str] = &[
    "unknown option",
    "unrecognized option",
    "unrecognised option",
    "invalid option",
    "invalid argument",
    "unknown command",
    "usage:",
];

/// Where an XML document came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// The source already was XML.
    AlreadyXml,
    /// The source was exported by the external tool.
    Exported {
        /// Label of the convention that succeeded.
        convention: String,
    },
}

impl Provenance {
    /// Human-readable status line.
    pub fn message(&self) -> String {
        match self {
            Self::AlreadyXml => "Source was already XML; no conversion needed.".to_string(),
            Self::Exported { convention } => {
                format!("Binary map asset exported to XML via CodeWalker ({convention}).")
            }
        }
    }
}

/// An XML document ready for extraction.
#[derive(Debug, Clone, Serialize)]
pub struct XmlSource {
    /// Path to the XML document.
    pub path: PathBuf,
    /// How it was obtained.
    pub provenance: Provenance,
    /// Attempts made, in order (empty for pass-through).
    pub attempts: Vec<AttemptRecord>,
}

/// Drives the external tool until a source is available as XML.
#[derive(Debug, Clone)]
pub struct ExportOrchestrator<R = HiddenProcessRunner> {
    config: ExportConfig,
    locator: ToolLocator,
    runner: R,
}

impl ExportOrchestrator<HiddenProcessRunner> {
    /// Orchestrator using the real hidden-process runner and environment
    /// discovery.
    pub fn new(config: ExportConfig) -> Self {
        let runner = HiddenProcessRunner::new(
            config.capture_output,
            Duration::from_millis(config.grace_period_ms),
        );
        Self::with_runner(config, ToolLocator::from_env(), runner)
    }
}

impl<R: SilentRunner> ExportOrchestrator<R> {
    /// Orchestrator with an explicit locator and runner.
    pub fn with_runner(config: ExportConfig, locator: ToolLocator, runner: R) -> Self {
        Self {
            config,
            locator,
            runner,
        }
    }

    /// Process runner in use.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Ensure `source` is available as XML.
    ///
    /// XML sources are returned unchanged without starting any process.
    /// Binary sources are exported with the first argument convention that
    /// yields a valid XML file.
    #[instrument(skip(self), fields(source = %source.display()))]
    pub async fn ensure_xml(
        &self,
        source: &Path,
        tool_hint: Option<&Path>,
    ) -> Result<XmlSource, ExportError> {
        if !tokio::fs::metadata(source)
            .await
            .is_ok_and(|m| m.is_file())
        {
            return Err(ExportError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let asset = SourceAsset::classify(source).await;
        if asset.is_xml() {
            info!("Source is already XML, skipping export");
            return Ok(XmlSource {
                path: source.to_path_buf(),
                provenance: Provenance::AlreadyXml,
                attempts: Vec::new(),
            });
        }

        let tool = self.resolve_tool(tool_hint)?;
        let conventions = convention::effective_conventions(&self.config);
        for c in &conventions {
            convention::validate(c)?;
        }

        let destination = self.destination_for(source).await?;
        info!(
            tool = %tool.executable.display(),
            destination = %destination.display(),
            conventions = conventions.len(),
            "Exporting binary asset"
        );

        self.run_attempts(&tool, source, &destination, &conventions)
            .await
    }

    /// Resolve the tool: call hint, then configured path, then discovery.
    pub fn resolve_tool(&self, tool_hint: Option<&Path>) -> Result<ToolInstallation, ExportError> {
        tool_hint
            .and_then(|h| self.locator.resolve_hint(h))
            .or_else(|| {
                self.config
                    .tool_path
                    .as_deref()
                    .and_then(|p| self.locator.resolve_hint(p))
            })
            .or_else(|| self.locator.discover())
            .ok_or_else(|| ExportError::ToolNotFound {
                guidance: format!(
                    "Set its location with `mapkoord config set-tool <path-to-{}>`, \
                     the {} environment variable, or export.tool_path in the config file.",
                    self.locator.file_name(),
                    TOOL_ENV_VAR
                ),
            })
    }

    /// Deterministic destination path for `source`.
    pub async fn destination_for(&self, source: &Path) -> Result<PathBuf, ExportError> {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "export".to_string());

        let dir = match self.config.output_location {
            OutputLocation::Temp => {
                let root = self.config.effective_temp_root();
                tokio::fs::create_dir_all(&root).await?;
                root
            }
            OutputLocation::Alongside => source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        let destination = dir.join(format!("{stem}.xml"));
        if destination == source {
            return Ok(dir.join(format!("{stem}.export.xml")));
        }
        Ok(destination)
    }

    async fn run_attempts(
        &self,
        tool: &ToolInstallation,
        source: &Path,
        destination: &Path,
        conventions: &[ArgConvention],
    ) -> Result<XmlSource, ExportError> {
        let watch = OutputWatch {
            path: destination.to_path_buf(),
            min_bytes: self.config.min_output_bytes,
            poll_interval: Duration::from_millis(self.config.poll_interval_ms),
            timeout: Duration::from_secs(self.config.attempt_timeout_seconds),
        };
        let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(conventions.len());

        for (index, c) in conventions.iter().enumerate() {
            clear_stale(destination).await?;

            let invocation = build_invocation(c, tool, source, destination);
            debug!(attempt = index + 1, convention = %c.label, "Starting export attempt");

            let record = match self.runner.run(&invocation, &watch).await {
                Ok(outcome) => self.judge(&c.label, outcome, destination).await?,
                Err(ExportError::Io(e)) => {
                    warn!(convention = %c.label, error = %e, "Could not start CodeWalker");
                    AttemptRecord {
                        convention: c.label.clone(),
                        outcome: AttemptOutcome::LaunchFailed,
                        exit_code: None,
                        terminated: false,
                        elapsed_ms: 0,
                        diagnostic: e.to_string(),
                    }
                }
                Err(e) => return Err(e),
            };

            let exported = record.outcome == AttemptOutcome::Exported;
            attempts.push(record);

            if exported {
                info!(convention = %c.label, attempt = index + 1, "Export succeeded");
                return Ok(XmlSource {
                    path: destination.to_path_buf(),
                    provenance: Provenance::Exported {
                        convention: c.label.clone(),
                    },
                    attempts,
                });
            }
        }

        warn!(attempts = attempts.len(), "All argument conventions exhausted");

        if !attempts.is_empty()
            && attempts
                .iter()
                .all(|a| a.outcome == AttemptOutcome::TimedOut)
        {
            return Err(ExportError::ExportTimeout {
                attempts,
                timeout_seconds: self.config.attempt_timeout_seconds,
            });
        }

        let diagnostic = attempts
            .iter()
            .rev()
            .map(|a| a.diagnostic.as_str())
            .find(|d| !d.trim().is_empty())
            .unwrap_or("(no output captured)")
            .to_string();
        Err(ExportError::ExportFailed {
            attempts,
            diagnostic,
        })
    }

    /// Turn a run outcome into an attempt verdict.
    async fn judge(
        &self,
        label: &str,
        outcome: RunOutcome,
        destination: &Path,
    ) -> Result<AttemptRecord, ExportError> {
        let combined = combine_output(&outcome.stdout, &outcome.stderr);

        let verdict = match outcome.status {
            RunStatus::OutputReady => {
                if sniff_file(destination).await {
                    AttemptOutcome::Exported
                } else {
                    warn!(convention = label, "Output file is not XML, discarding");
                    clear_stale(destination).await?;
                    AttemptOutcome::NotXml
                }
            }
            RunStatus::Exited if is_usage_error(&combined) => {
                debug!(convention = label, "Tool rejected the arguments");
                AttemptOutcome::UsageError
            }
            RunStatus::Exited => {
                debug!(convention = label, exit_code = ?outcome.exit_code, "Tool exited without output");
                AttemptOutcome::ExitedWithoutOutput
            }
            RunStatus::TimedOut => {
                warn!(
                    convention = label,
                    timeout_s = self.config.attempt_timeout_seconds,
                    "Attempt timed out"
                );
                AttemptOutcome::TimedOut
            }
        };

        Ok(AttemptRecord {
            convention: label.to_string(),
            outcome: verdict,
            exit_code: outcome.exit_code,
            terminated: outcome.terminated,
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            diagnostic: tail_chars(combined.trim(), self.config.diagnostic_tail_chars),
        })
    }
}

/// Remove a leftover destination so it cannot be mistaken for fresh output.
async fn clear_stale(destination: &Path) -> Result<(), ExportError> {
    match tokio::fs::remove_file(destination).await {
        Ok(()) => {
            debug!(path = %destination.display(), "Removed stale destination file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ExportError::Io(e)),
    }
}

fn combine_output(stdout: &str, stderr: &str) -> String {
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (true, true) => String::new(),
        (false, true) => stdout.to_string(),
        (true, false) => stderr.to_string(),
        (false, false) => format!("{stdout}\n{stderr}"),
    }
}

/// Whether captured output looks like an argument rejection.
pub fn is_usage_error(output: &str) -> bool {
    let lower = output.to_lowercase();
    USAGE_MARKERS.iter().any(|m| lower.contains(m))
}
