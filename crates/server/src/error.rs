//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kagami_mirror::{AnalyticsError, MirrorError};
use serde::Serialize;

/// API error response: a short code and a human-readable detail.
///
/// Upstream status codes surface in the detail; secret material never does.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error: String,
    /// Human-readable error message.
    pub detail: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("synchronization failed: {0}")]
    Mirror(#[from] MirrorError),

    #[error("analytics query failed: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Mirror(error) => match error.stage() {
                "input" => "bad_request",
                "fetch" => "fetch_failed",
                "upload" => "upload_failed",
                _ => "signing_failed",
            },
            Self::Analytics(error) => match error {
                AnalyticsError::Provider { .. } => "provider_error",
                AnalyticsError::Signer(_) => "signing_failed",
                _ => "metrics_unavailable",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Mirror(error) => match error.stage() {
                "input" => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Analytics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code().to_string(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
