//! Unified application error for Ruzma.
//!
//! Every crate converts its failures into [`AppError`] so they propagate with
//! `?` up to the HTTP layer, where [`IntoResponse`] turns them into a status
//! code and an [`ApiErrorResponse`] body.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::types::response::ApiErrorResponse;

/// Broad category of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No milestone (or other resource) with the given id.
    NotFound,
    /// The request itself is malformed.
    Validation,
    /// The request is well-formed but a business rule refuses it, such as a
    /// used-up revision quota or a full link list.
    Policy,
    /// Another writer kept changing the same row.
    Conflict,
    /// The database failed.
    Database,
    /// Configuration could not be loaded.
    Configuration,
    /// JSON encoding or decoding failed.
    Serialization,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Upper-case name used in logs and `Display`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Policy => "POLICY",
            Self::Conflict => "CONFLICT",
            Self::Database => "DATABASE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }

    /// HTTP status for this kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation | Self::Policy => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Database | Self::Configuration | Self::Serialization | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code in the `error` field of API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Policy => "POLICY_VIOLATION",
            Self::NotFound | Self::Conflict => self.as_str(),
            Self::Database | Self::Configuration | Self::Serialization | Self::Internal => {
                "INTERNAL_ERROR"
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error: a kind, a message, optional details for API callers and
/// an optional underlying cause.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Category.
    pub kind: ErrorKind,
    /// Message; returned to callers for client errors only.
    pub message: String,
    /// Structured details, e.g. the offending links of a save request.
    pub details: Option<serde_json::Value>,
    /// Underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create an error of `kind`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create an error of `kind` that wraps `source`.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn policy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Policy, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

// The boxed source is not `Clone`; clones keep everything else.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("Invalid JSON: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Invalid configuration: {err}"),
            err,
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        let message = if status.is_server_error() {
            tracing::error!(kind = %self.kind, error = %self.message, "Request failed");
            "Internal server error".to_string()
        } else {
            self.message
        };

        let body = ApiErrorResponse {
            error: self.kind.code().to_string(),
            message,
            details: self.details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_maps_to_bad_request() {
        let err = AppError::policy("Revision limit reached");
        assert_eq!(err.kind.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind.code(), "POLICY_VIOLATION");
        assert_eq!(err.to_string(), "POLICY: Revision limit reached");
    }

    #[test]
    fn test_server_errors_share_one_code() {
        assert_eq!(ErrorKind::Database.code(), "INTERNAL_ERROR");
        assert_eq!(ErrorKind::Conflict.code(), "CONFLICT");
        assert_eq!(ErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_clone_keeps_details() {
        let err = AppError::validation("bad").with_details(serde_json::json!([{ "index": 0 }]));
        let cloned = err.clone();
        assert_eq!(cloned.details, err.details);
        assert!(cloned.source.is_none());
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::not_found("Milestone not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::database("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
