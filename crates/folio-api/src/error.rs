//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`FolioError`] categories to HTTP status codes and a JSON body
//! with error code, message and, for validation failures, the offending
//! field names. Dependency and internal failure details are logged and
//! never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::{FolioError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// `{"fields": [...]}` for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource missing or not owned by the caller (404).
    #[error("{0}")]
    NotFound(String),

    /// Caller input failed validation (400) with the offending fields.
    #[error("{message}")]
    Validation { message: String, fields: Vec<String> },

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("{0}")]
    Conflict(String),

    /// External collaborator failed (502). Message is logged, not returned.
    #[error("dependency error: {0}")]
    Dependency(String),

    /// Internal server error (500). Message is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Dependency(_) => (StatusCode::BAD_GATEWAY, "DEPENDENCY_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Dependency(detail) => {
                tracing::error!(error = %detail, "dependency failure");
                "An upstream service is unavailable".to_string()
            }
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let details = match &self {
            Self::Validation { fields, .. } if !fields.is_empty() => {
                Some(serde_json::json!({ "fields": fields }))
            }
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            fields: err.fields(),
            message: err.to_string(),
        }
    }
}

impl From<FolioError> for AppError {
    fn from(err: FolioError) -> Self {
        match err {
            FolioError::Validation(v) => v.into(),
            FolioError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            FolioError::Conflict(msg) => Self::Conflict(msg),
            FolioError::Dependency(detail) => Self::Dependency(detail),
            FolioError::Persistence(detail) => Self::Internal(detail),
        }
    }
}

impl From<folio_state::VerificationError> for AppError {
    fn from(err: folio_state::VerificationError) -> Self {
        FolioError::from(err).into()
    }
}
