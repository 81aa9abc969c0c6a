//! Convenience result type alias for Ruzma.

use crate::error::AppError;

/// A specialized `Result` type for Ruzma operations.
pub type AppResult<T> = Result<T, AppError>;
