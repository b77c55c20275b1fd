//! Error mapping for the PostgreSQL adapter

use errors::AppError;
use ports::{ColumnError, StreamFault};

/// SQLSTATE codes the server uses to reject a presented credential
const INVALID_PASSWORD: &str = "28P01";
const INVALID_AUTHORIZATION: &str = "28000";

/// Classify a failure while establishing a session
pub fn map_connect_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db)
            if matches!(
                db.code().as_deref(),
                Some(INVALID_PASSWORD) | Some(INVALID_AUTHORIZATION)
            ) =>
        {
            AppError::credential(format!("Database rejected access token: {}", db.message()))
        }
        sqlx::Error::Configuration(e) => {
            AppError::configuration(format!("Invalid database descriptor: {}", e))
        }
        _ => AppError::connectivity(format!("Failed to connect to database: {}", err)),
    }
}

/// Any failure reported for a statement itself
pub fn map_query_error(err: sqlx::Error) -> AppError {
    AppError::query(format!("Failed to query products: {}", err))
}

pub fn map_stream_error(err: sqlx::Error) -> StreamFault {
    StreamFault::new(err.to_string())
}

pub fn map_column_error(err: sqlx::Error) -> ColumnError {
    match err {
        sqlx::Error::ColumnIndexOutOfBounds { index, len } => ColumnError::OutOfRange { index, len },
        sqlx::Error::ColumnDecode { index, source } => {
            let index = index.trim_matches('"').parse().unwrap_or(usize::MAX);
            if source.is::<sqlx::error::UnexpectedNullError>() {
                ColumnError::Null { index }
            } else {
                ColumnError::Mismatch {
                    index,
                    message: source.to_string(),
                }
            }
        }
        other => ColumnError::Mismatch {
            index: usize::MAX,
            message: other.to_string(),
        },
    }
}
