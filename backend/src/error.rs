//! Error taxonomy for the selection backend.
//!
//! Validation and not-found errors are recovered at the HTTP boundary and
//! turned into specific messages; parse and external-dependency failures
//! propagate as one aggregate failure with the cause kept for logs; store
//! and serialization errors surface as opaque internal failures. Nothing
//! here retries automatically.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("spreadsheet parse failed: {0}")]
    SpreadsheetParse(String),

    #[error("external service failure: {0}")]
    ExternalApi(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidParams(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        AppError::SpreadsheetParse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApi(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
