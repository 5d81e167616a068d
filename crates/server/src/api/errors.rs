//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uservec_core::StoreError;

/// Body returned for any embedding whose length differs from the store dimension.
pub const INVALID_EMBEDDING_SIZE: &str = "Invalid embedding size";

/// Application-level error type that implements `IntoResponse`.
///
/// Each variant maps to an HTTP status code:
/// - `BadRequest` → 400
/// - `NotFound` → 404
/// - `ServiceUnavailable` → 503
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request parameters (400).
    BadRequest(String),
    /// Unknown vector id (404).
    NotFound(String),
    /// Text encoder missing or failing (503).
    ServiceUnavailable(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DimensionMismatch { .. } => {
                ApiError::BadRequest(INVALID_EMBEDDING_SIZE.to_string())
            }
            StoreError::MissingField(_)
            | StoreError::InvalidEmbedding(_)
            | StoreError::InvalidMetadata(_)
            | StoreError::InvalidText(_) => ApiError::BadRequest(err.to_string()),
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Encoder(_) => {
                tracing::warn!(error = %err, "Text encoder call failed");
                ApiError::ServiceUnavailable(err.to_string())
            }
            StoreError::InvalidDimension { .. }
            | StoreError::DuplicateId(_)
            | StoreError::InvariantViolation(_) => {
                tracing::error!(error = %err, "Internal store error");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
