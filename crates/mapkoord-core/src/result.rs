//! Convenience result type alias for MapKoord.

use crate::error::AppError;

/// A specialized `Result` type for MapKoord operations.
pub type AppResult<T> = Result<T, AppError>;
