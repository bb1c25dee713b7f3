//! # HTTP Errors
//!
//! Every failure leaves the server as `{"error", "code", "status"}`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::observability::Event;
use crate::service::ServiceError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    // ==================
    // Client Errors (4xx)
    // ==================
    /// Body is not acceptable JSON
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Path segment is not an id
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Worker task died before answering
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::InvalidBody(_) | ApiError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Service(e) => e.code(),
            ApiError::InvalidBody(_) => "CITIZENS_INVALID_BODY",
            ApiError::InvalidPath(_) => "CITIZENS_INVALID_PATH",
            ApiError::Internal(_) => "CITIZENS_INTERNAL_ERROR",
        }
    }

    /// Whether the client caused the failure
    pub fn is_client_error(&self) -> bool {
        match self {
            ApiError::Service(e) => e.is_client_error(),
            ApiError::InvalidBody(_) | ApiError::InvalidPath(_) => true,
            ApiError::Internal(_) => false,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidPath(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub status: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
            status: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            warn!(event = %Event::RequestRejected, code = self.code(), error = %self, "request rejected");
        } else {
            error!(event = %Event::RequestFailed, code = self.code(), error = %self, "request failed");
        }
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}
