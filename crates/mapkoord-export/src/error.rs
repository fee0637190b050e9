//! Error type for the export subsystem.
//!
//! Maps cleanly to `mapkoord_core::error::AppError`, with every variant
//! carrying a message that tells the user what to check.

use mapkoord_core::error::{AppError, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;

use crate::attempt::AttemptRecord;

/// Unified error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The source asset does not exist.
    #[error("Source file not found: {path}")]
    SourceNotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// No usable CodeWalker executable could be located.
    #[error("CodeWalker executable not found. {guidance}")]
    ToolNotFound {
        /// What the user can do about it.
        guidance: String,
    },

    /// Every argument convention was tried without producing XML.
    #[error(
        "CodeWalker export failed after {} attempt(s); last output: {diagnostic}",
        .attempts.len()
    )]
    ExportFailed {
        /// All attempts in the order they were made.
        attempts: Vec<AttemptRecord>,
        /// Truncated tail of the last captured diagnostic output.
        diagnostic: String,
    },

    /// Every attempt ran into its timeout.
    #[error(
        "CodeWalker produced no XML within {timeout_seconds}s on any of {} attempt(s)",
        .attempts.len()
    )]
    ExportTimeout {
        /// All attempts in the order they were made.
        attempts: Vec<AttemptRecord>,
        /// Per-attempt timeout that was exceeded.
        timeout_seconds: u64,
    },

    /// A configured argument convention cannot be used.
    #[error("Invalid argument convention '{label}': {reason}")]
    InvalidConvention {
        /// Convention label.
        label: String,
        /// What is wrong with it.
        reason: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tokio task join error.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ExportError {
    /// True for both exhausted-attempts failures, timeout included.
    pub fn is_export_failure(&self) -> bool {
        matches!(self, Self::ExportFailed { .. } | Self::ExportTimeout { .. })
    }

    /// Attempt records carried by an export failure.
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            Self::ExportFailed { attempts, .. } | Self::ExportTimeout { attempts, .. } => attempts,
            _ => &[],
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        let message = err.to_string();
        match err {
            ExportError::SourceNotFound { .. } => {
                AppError::not_found(format!("{message}. Check the file path."))
            }
            ExportError::ToolNotFound { .. } | ExportError::InvalidConvention { .. } => {
                AppError::configuration(message)
            }
            ExportError::ExportFailed { .. } => AppError::external_tool(format!(
                "{message}\nCheck that your CodeWalker version supports XML export from the command line."
            )),
            ExportError::ExportTimeout { .. } => AppError::timeout(format!(
                "{message}\nCheck that CodeWalker starts on this machine, or raise export.attempt_timeout_seconds."
            )),
            ExportError::Io(e) => AppError::with_source(ErrorKind::Io, message, e),
            ExportError::Join(e) => AppError::with_source(ErrorKind::Internal, message, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::AttemptOutcome;

    fn record(outcome: AttemptOutcome) -> AttemptRecord {
        AttemptRecord {
            convention: "-exportxml".to_string(),
            outcome,
            exit_code: Some(1),
            terminated: false,
            elapsed_ms: 12,
            diagnostic: "usage: CodeWalker".to_string(),
        }
    }

    #[test]
    fn test_timeout_is_export_failure() {
        let err = ExportError::ExportTimeout {
            attempts: vec![record(AttemptOutcome::TimedOut)],
            timeout_seconds: 5,
        };
        assert!(err.is_export_failure());
        assert_eq!(err.attempts().len(), 1);
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = ExportError::ToolNotFound {
            guidance: "configure it".to_string(),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::Configuration);

        let err: AppError = ExportError::ExportFailed {
            attempts: vec![record(AttemptOutcome::UsageError)],
            diagnostic: "usage: CodeWalker".to_string(),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::ExternalTool);
        assert!(err.message.contains("usage: CodeWalker"));

        let err: AppError = ExportError::SourceNotFound {
            path: PathBuf::from("/maps/missing.ymap"),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
