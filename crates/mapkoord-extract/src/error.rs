//! Error type for coordinate extraction.

use mapkoord_core::error::{AppError, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or parsing a map document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML (or uses a DTD).
    #[error("Malformed XML: {0}")]
    Parse(String),

    /// The blocking parse task failed.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<roxmltree::Error> for ExtractError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        let message = err.to_string();
        match err {
            ExtractError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                AppError::with_source(
                    ErrorKind::NotFound,
                    format!("{message}. Check the file path."),
                    source,
                )
            }
            ExtractError::Io { source, .. } => AppError::with_source(ErrorKind::Io, message, source),
            ExtractError::Parse(_) => AppError::parse(format!(
                "{message}\nThe file does not look like a map XML export."
            )),
            ExtractError::Join(e) => AppError::with_source(ErrorKind::Internal, message, e),
        }
    }
}
