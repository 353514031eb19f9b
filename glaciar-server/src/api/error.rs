//! Error replies
//!
//! Every failure is rendered as `{"success": false, "error": ..., "details"?: [...]}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use glaciar_common::api::{ApiAuthError, ErrorResponse};
use thiserror::Error;
use tracing::error;

/// API error types for HTTP responses
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Business-rule violations (400), one message per violation
    #[error("Validation failed: {error}")]
    Validation { error: String, details: Vec<String> },

    /// No session, or bad credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Logged in without the needed role (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected failure (500); the cause is logged, not returned
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(error: impl Into<String>, details: Vec<String>) -> Self {
        ApiError::Validation {
            error: error.into(),
            details,
        }
    }

    pub fn project_not_found() -> Self {
        ApiError::NotFound("Proyecto no encontrado".to_string())
    }
}

impl From<glaciar_common::Error> for ApiError {
    fn from(e: glaciar_common::Error) -> Self {
        match e {
            glaciar_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            glaciar_common::Error::Csv(e) => {
                ApiError::BadRequest(format!("No se pudo leer el archivo CSV: {}", e))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ApiAuthError> for ApiError {
    fn from(e: ApiAuthError) -> Self {
        match e {
            ApiAuthError::DatabaseError(msg) => ApiError::Internal(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            ApiError::Validation { error, details } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(error).with_details(details),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorResponse::new(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse::new(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Error interno del servidor"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint no encontrado".to_string())
}
