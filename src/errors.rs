//! Structured API errors with machine-readable codes
//!
//! Store failures are reported to clients with a generic message; the
//! underlying error chain only goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::ERRORS_TOTAL;

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum AppError {
    // Validation Errors (400)
    InvalidInput { field: String, reason: String },

    // Collaborator failures (500). `operation` is the client-facing summary.
    StoreError {
        operation: &'static str,
        source: anyhow::Error,
    },

    Internal(anyhow::Error),
}

impl AppError {
    pub fn invalid_input(field: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn store(operation: &'static str, source: anyhow::Error) -> Self {
        Self::StoreError { operation, source }
    }

    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::StoreError { .. } => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::StoreError { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Never includes store internals.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput { reason, .. } => reason.clone(),
            Self::StoreError { operation, .. } => format!("Failed to {operation}"),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            Self::InvalidInput { field, .. } => Some(format!("field: {field}")),
            _ => None,
        };
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message(),
            details,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreError { operation, source } => {
                write!(f, "Failed to {operation}: {source:#}")
            }
            Self::Internal(err) => write!(f, "Internal error: {err:#}"),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ERRORS_TOTAL.with_label_values(&[self.code()]).inc();

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "Request rejected");
        }

        (status, Json(self.to_response())).into_response()
    }
}

/// Helper trait to convert validation errors
pub trait ValidationErrorExt<T> {
    fn map_validation_err(self, field: &str) -> Result<T>;
}

impl<T, E: fmt::Display> ValidationErrorExt<T> for std::result::Result<T, E> {
    fn map_validation_err(self, field: &str) -> Result<T> {
        self.map_err(|e| AppError::invalid_input(field, e))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::invalid_input("mode", "bad").code(), "INVALID_INPUT");
        assert_eq!(
            AppError::store("fetch coverage matrix", anyhow::anyhow!("boom")).code(),
            "STORE_ERROR"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::invalid_input("mode", "bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::store("fetch coverage filters", anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_does_not_leak_detail() {
        let err = AppError::store(
            "fetch coverage matrix",
            anyhow::anyhow!("password authentication failed for user \"coverage\""),
        );
        let response = err.to_response();
        assert_eq!(response.message, "Failed to fetch coverage matrix");
        assert!(response.details.is_none());
        assert!(err.to_string().contains("password authentication failed"));
    }

    #[test]
    fn test_validation_ext() {
        let parsed: std::result::Result<u8, _> = "x".parse::<u8>();
        let err = parsed.map_validation_err("limit").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert_eq!(err.to_response().details.as_deref(), Some("field: limit"));
    }
}
