//! External conversion tool configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where the exported XML is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLocation {
    /// Under the export temp root.
    #[default]
    Temp,
    /// Next to the source file.
    Alongside,
}

/// How a convention's process is launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LauncherKind {
    /// Run the tool executable directly.
    #[default]
    Direct,
    /// Wrap the tool in `powershell Start-Process -WindowStyle Hidden -Wait`.
    Powershell,
}

/// One command-line invocation shape for the external tool.
///
/// Arguments are templates; `{input}`, `{output}`, `{input_dir}` and
/// `{output_dir}` are substituted per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgConvention {
    /// Short label used in logs and diagnostics.
    pub label: String,
    /// Launcher used to start the process.
    #[serde(default)]
    pub launcher: LauncherKind,
    /// Argument templates.
    pub args: Vec<String>,
}

impl ArgConvention {
    /// Direct invocation with the given argument templates.
    pub fn direct(label: impl Into<String>, args: &[&str]) -> Self {
        Self {
            label: label.into(),
            launcher: LauncherKind::Direct,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// PowerShell-hidden invocation with the given argument templates.
    pub fn powershell(label: impl Into<String>, args: &[&str]) -> Self {
        Self {
            launcher: LauncherKind::Powershell,
            ..Self::direct(label, args)
        }
    }
}

/// Configuration for driving the external XML exporter.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Explicit tool path. Takes priority over discovery, after a
    /// per-call hint.
    pub tool_path: Option<PathBuf>,

    /// Timeout for a single invocation attempt.
    #[validate(range(min = 1, max = 3600))]
    pub attempt_timeout_seconds: u64,

    /// Interval between destination file polls.
    #[validate(range(min = 10, max = 10000))]
    pub poll_interval_ms: u64,

    /// Time between the graceful termination request and a forced kill.
    #[validate(range(max = 60000))]
    pub grace_period_ms: u64,

    /// Minimum output size (bytes) before the output counts as written.
    #[validate(range(min = 1))]
    pub min_output_bytes: u64,

    /// Maximum characters of captured output kept for diagnostics.
    #[validate(range(min = 80, max = 100000))]
    pub diagnostic_tail_chars: usize,

    /// Where exported XML files are placed.
    pub output_location: OutputLocation,

    /// Root directory for exports when `output_location` is `temp`.
    pub temp_root: Option<PathBuf>,

    /// Whether to capture the tool's stdout/stderr.
    pub capture_output: bool,

    /// Ordered argument conventions. Empty means the built-in defaults.
    pub conventions: Vec<ArgConvention>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            tool_path: None,
            attempt_timeout_seconds: default_attempt_timeout_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
            grace_period_ms: default_grace_period_ms(),
            min_output_bytes: default_min_output_bytes(),
            diagnostic_tail_chars: default_diagnostic_tail_chars(),
            output_location: OutputLocation::default(),
            temp_root: None,
            capture_output: true,
            conventions: Vec::new(),
        }
    }
}

fn default_attempt_timeout_seconds() -> u64 {
    90
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_grace_period_ms() -> u64 {
    3000
}

fn default_min_output_bytes() -> u64 {
    100
}

fn default_diagnostic_tail_chars() -> usize {
    2000
}

impl ExportConfig {
    /// Resolve the effective temp root directory.
    pub fn effective_temp_root(&self) -> PathBuf {
        self.temp_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("mapkoord"))
    }
}
