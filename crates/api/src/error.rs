use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use samo_activenet::error::UpstreamError;
use samo_core::types::ActivityId;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`UpstreamError`] for upstream failures and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON
/// error responses. Upstream internals (tokens, cookies, raw bodies)
/// never reach the visitor; details go to `tracing` server-side.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure talking to the ActiveNet upstream.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The request referenced a session id this process does not know.
    #[error("Session not found")]
    SessionNotFound,

    /// The requested activity does not exist upstream.
    #[error("Activity {0} not found")]
    ActivityNotFound(ActivityId),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Upstream failures ---
            AppError::Upstream(upstream) => match upstream {
                UpstreamError::Network(err) => {
                    tracing::error!(error = %err, "upstream unreachable");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_UNAVAILABLE",
                        "The booking service could not be reached".to_string(),
                    )
                }
                UpstreamError::Protocol(detail) => {
                    tracing::error!(detail = %detail, "upstream protocol error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "The booking service returned an unexpected response".to_string(),
                    )
                }
                UpstreamError::Auth(_) => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Sign-in with the booking service failed".to_string(),
                ),
                // Business messages are written for end users upstream;
                // safe to pass through.
                UpstreamError::Business { code, message } => {
                    tracing::warn!(code = %code, "upstream rejected the request");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_REJECTED",
                        message.clone(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::SessionNotFound => (
                StatusCode::UNAUTHORIZED,
                "SESSION_NOT_FOUND",
                "Session expired or unknown".to_string(),
            ),
            AppError::ActivityNotFound(id) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Activity {id} not found"),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
