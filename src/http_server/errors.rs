//! # HTTP API Errors

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::schema::{SchemaError, SchemaErrorCode};

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not JSON or lacks required fields
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Engine error
    #[error("{0}")]
    Schema(#[from] SchemaError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Schema(err) => match err.code() {
                SchemaErrorCode::MalformedSchema
                | SchemaErrorCode::UnsupportedReference
                | SchemaErrorCode::TypeMismatch
                | SchemaErrorCode::InvalidPointer => StatusCode::BAD_REQUEST,
                SchemaErrorCode::UnknownSchema => StatusCode::NOT_FOUND,
                SchemaErrorCode::SchemaImmutable => StatusCode::CONFLICT,
                SchemaErrorCode::ValidationFailed | SchemaErrorCode::DepthExceeded => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            },
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidBody(_) => "SCHEMERGE_INVALID_BODY",
            ApiError::Schema(err) => err.code().code(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let violations = match err {
            ApiError::Schema(e) => e.violations().to_vec(),
            ApiError::InvalidBody(_) => Vec::new(),
        };
        Self {
            error: err.to_string(),
            code: err.code(),
            violations,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(status = status.as_u16(), code = self.code(), "request rejected: {}", self);
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
