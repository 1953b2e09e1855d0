//! Error types for ideahub-server
//!
//! Core errors map onto HTTP statuses here; nothing below the web layer
//! knows about status codes.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ideahub_common::Error;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid session cookie (401)
    #[error("Not authenticated")]
    Unauthenticated,

    /// Malformed request body or form (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// ideahub-common error
    #[error(transparent)]
    Core(#[from] Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Core(err) => match err {
                Error::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
                Error::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                Error::LastPage => (StatusCode::BAD_REQUEST, "LAST_PAGE"),
                Error::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                Error::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
                Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
                Error::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();

        // Storage details stay in the log
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
