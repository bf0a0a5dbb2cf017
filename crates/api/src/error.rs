//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Client errors are JSON: `{"error": "..."}`, or a `{"field": "message"}` map
//! for validation failures.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{ServiceError, ValidationErrors};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A service rejected or failed the request.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client (malformed body, path or query).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err {
                ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::InvalidReference { .. } | ServiceError::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::PasswordHash | ServiceError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match self {
            Self::Service(ServiceError::Validation(errors)) => json!(errors),
            Self::Service(ServiceError::InvalidReference { field, message }) => {
                json!(ValidationErrors::single(field, message))
            }
            Self::Service(ServiceError::NotFound { entity, id }) => {
                json!({ "error": format!("{} {id} not found", capitalize(entity)) })
            }
            Self::Service(ServiceError::Unauthorized) => {
                json!({ "error": "Old password does not match." })
            }
            Self::Service(ServiceError::Conflict(message)) => json!({ "error": message }),
            Self::NotFound(message) | Self::BadRequest(message) => json!({ "error": message }),
            Self::Service(ServiceError::PasswordHash | ServiceError::Repository(_)) => {
                json!({ "error": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
