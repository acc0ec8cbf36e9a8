//! Error types for web handlers.
//!
//! Bridges the domain error taxonomy to HTTP responses via Axum's
//! `IntoResponse`: `Validation` → 400, `NotFound` → 404, `Closed` →
//! 409, `InvalidTransition` → 400, authorization denials → 403.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use supportdesk_core::TicketError;

/// Application error type for web handlers.
///
/// Wraps domain errors and provides HTTP-friendly error responses
/// with a machine-readable code and a user-facing message.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    #[allow(dead_code)]
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 400 error for an attachment over the size cap.
    #[must_use]
    pub fn attachment_too_large(limit_bytes: usize) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("attachment exceeds the {limit_bytes} byte limit"),
            "ATTACHMENT_TOO_LARGE".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            message.into(),
            "CONFLICT".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                "Internal server error"
            );
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        match &err {
            TicketError::Validation(msg) => Self::new(
                StatusCode::BAD_REQUEST,
                msg.clone(),
                "VALIDATION_ERROR".to_string(),
            ),
            TicketError::NotFound(id) => Self::not_found("Ticket", id),
            TicketError::Closed(_) => Self::conflict(err.to_string()),
            TicketError::InvalidTransition { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                err.to_string(),
                "INVALID_TRANSITION".to_string(),
            ),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;
    use supportdesk_core::types::{Status, TicketId};

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let id = TicketId::new();

        let err: AppError = TicketError::NotFound(id).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: AppError = TicketError::Closed(id).into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: AppError = TicketError::validation("subject must not be blank").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "VALIDATION_ERROR");

        let err: AppError = TicketError::InvalidTransition {
            old: Status::Closed,
            new: Status::InProgress,
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_TRANSITION");
    }

    #[test]
    fn display_includes_the_code() {
        let err = AppError::attachment_too_large(5);
        assert_eq!(
            err.to_string(),
            "[ATTACHMENT_TOO_LARGE] attachment exceeds the 5 byte limit"
        );
    }
}
