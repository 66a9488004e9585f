// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::engine::{EngineError, ErrorKind};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError { message: String, code: &'static str },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden { message: String, code: &'static str },

    // 404 Not Found
    NotFound { message: String, code: &'static str },

    // 409 Conflict
    Conflict { message: String, code: &'static str },

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden { .. } => 403,
            ApiError::NotFound { .. } => 404,
            ApiError::Conflict { .. } => 409,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden { message, .. } => message,
            ApiError::NotFound { message, .. } => message,
            ApiError::Conflict { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { code, .. } => code,
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden { code, .. } => code,
            ApiError::NotFound { code, .. } => code,
            ApiError::Conflict { code, .. } => code,
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

/// Every enumerated engine failure surfaces as a typed 4xx; only
/// infrastructure faults fall through to a generic 500.
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let code = err.code();
        match err.kind() {
            ErrorKind::Validation => ApiError::ValidationError {
                message: err.to_string(),
                code,
            },
            ErrorKind::Conflict | ErrorKind::ReferentialIntegrity | ErrorKind::State => {
                ApiError::Conflict {
                    message: err.to_string(),
                    code,
                }
            }
            ErrorKind::Immutable => ApiError::Forbidden {
                message: err.to_string(),
                code,
            },
            ErrorKind::NotFound => ApiError::NotFound {
                message: err.to_string(),
                code,
            },
            ErrorKind::Internal => {
                tracing::error!("engine internal error: {}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
