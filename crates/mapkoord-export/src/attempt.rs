//! Per-attempt diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a single argument-convention attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The destination was written and sniffs as XML.
    Exported,
    /// The destination was written but is not XML; it was removed.
    NotXml,
    /// The tool rejected the arguments (usage / unknown option output).
    UsageError,
    /// The tool exited without writing a usable destination file.
    ExitedWithoutOutput,
    /// Nothing usable appeared before the attempt timeout.
    TimedOut,
    /// The process could not be started.
    LaunchFailed,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Exported => "exported",
            Self::NotXml => "output not XML",
            Self::UsageError => "usage error",
            Self::ExitedWithoutOutput => "exited without output",
            Self::TimedOut => "timed out",
            Self::LaunchFailed => "launch failed",
        };
        f.write_str(text)
    }
}

/// Record of one attempt, in the order attempts were made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Label of the argument convention used.
    pub convention: String,
    /// How the attempt ended.
    pub outcome: AttemptOutcome,
    /// Exit code, if the process exited or was reaped after termination.
    pub exit_code: Option<i32>,
    /// Whether the process had to be terminated.
    pub terminated: bool,
    /// Wall-clock duration of the attempt.
    pub elapsed_ms: u64,
    /// Tail of captured stdout/stderr (or the launch error).
    pub diagnostic: String,
}

/// Keep at most `max_chars` characters from the end of `text`, the leading
/// `…` marker included.
pub fn tail_chars(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let tail: String = text.chars().skip(count - (max_chars - 1)).collect();
    format!("…{tail}")
}
