//! HTTP mapping of crate errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PremiaError};

/// API error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// Error returned by handlers; keeps the crate error for logging.
#[derive(Debug)]
pub struct ApiError(pub PremiaError);

impl From<PremiaError> for ApiError {
    fn from(err: PremiaError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status and machine-readable code for the wrapped error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self.0.kind() {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Authentication => (StatusCode::BAD_GATEWAY, "AUTHENTICATION_ERROR"),
            ErrorKind::Upstream => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code, "request failed");
        } else {
            tracing::warn!(error = %self.0, code, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
            code: code.to_string(),
        });
        (status, body).into_response()
    }
}
