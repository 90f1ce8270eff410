//! Convenience result type alias for framekit.

use crate::error::AppError;

/// A specialized `Result` type for framekit operations.
pub type AppResult<T> = Result<T, AppError>;
