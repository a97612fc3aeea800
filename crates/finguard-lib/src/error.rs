// crates/finguard-lib/src/error.rs

//! Central error type.
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::validation::ValidationError;

/// Generic message shown for failures whose details must not leak
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded")]
    RateLimited {
        blocked_until: Option<DateTime<Utc>>,
    },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::RateLimited { .. } => "RATE_001",
            AppError::Auth(_) => "AUTH_001",
            AppError::Storage(_) => "STORE_001",
            AppError::Config(_) => "CFG_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a message suitable for showing to the person signing in.
    ///
    /// Validation and provider messages are already user-facing; everything
    /// else collapses to a generic message.
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Auth(msg) => msg.clone(),
            AppError::RateLimited {
                blocked_until: Some(until),
            } => format!(
                "Too many failed attempts. Try again after {}.",
                until.format("%H:%M:%S")
            ),
            AppError::RateLimited { blocked_until: None } => {
                "Too many failed attempts. Try again later.".to_string()
            },
            AppError::Storage(_)
            | AppError::Config(_)
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::Json(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
