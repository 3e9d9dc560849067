use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Error taxonomy for the redirect core.
///
/// - [`AppError::NotFound`] - unknown link or account, user-visible, terminal
/// - [`AppError::Validation`] - malformed geo header or queue message, user-visible 4xx
/// - [`AppError::Routing`] - link misconfigured with no reachable destination;
///   surfaced to the owner via logs, the visitor sees a 404
/// - [`AppError::Retryable`] - transient storage/queue failure, redelivered by
///   the delivery mechanism
/// - [`AppError::Fatal`] - contract violation, dead-lettered, never retried
/// - [`AppError::Internal`] - unexpected infrastructure failure
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Routing { message: String, details: Value },
    Retryable { message: String, details: Value },
    Fatal { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn routing(message: impl Into<String>, details: Value) -> Self {
        Self::Routing {
            message: message.into(),
            details,
        }
    }
    pub fn retryable(message: impl Into<String>, details: Value) -> Self {
        Self::Retryable {
            message: message.into(),
            details,
        }
    }
    pub fn fatal(message: impl Into<String>, details: Value) -> Self {
        Self::Fatal {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation { message, .. } => write!(f, "validation error: {}", message),
            AppError::NotFound { message, .. } => write!(f, "not found: {}", message),
            AppError::Routing { message, .. } => write!(f, "routing error: {}", message),
            AppError::Retryable { message, .. } => write!(f, "retryable error: {}", message),
            AppError::Fatal { message, .. } => write!(f, "fatal error: {}", message),
            AppError::Internal { message, .. } => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            // The visitor-facing contract for the redirect path is 302/404/400.
            // The owner-facing detail is logged where the error arises.
            AppError::Routing { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Retryable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "retryable_error",
                message,
                details,
            ),
            AppError::Fatal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "fatal_error",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Classifies a sqlx error for the delivery mechanism.
///
/// Connection-class failures are transient and eligible for redelivery;
/// everything else is an internal error.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            AppError::retryable("Database unavailable", json!({ "reason": e.to_string() }))
        }
        _ => AppError::internal("Database error", json!({ "reason": e.to_string() })),
    }
}
