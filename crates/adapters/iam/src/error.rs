//! Error types for the IAM adapter

use errors::AppError;

/// Every token acquisition failure is fatal to the operation
pub fn map_token_error(err: impl std::fmt::Display, context: &str) -> AppError {
    AppError::credential(format!("{}: {}", context, err))
}
