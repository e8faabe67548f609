//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures errors to Sentry before
//! responding to the client. Every error body is an [`AuthResponse`] so the
//! client can parse failures the same way as successes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::AuthResponse;
use crate::services::auth::AuthError;

/// Error type for the auth API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Wrong HTTP method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(_) | AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists { .. } => StatusCode::CONFLICT,
                AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
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
        let body = match &self {
            Self::Auth(AuthError::Validation(e)) => AuthResponse::invalid(e.field, e.message.clone()),
            Self::Auth(AuthError::BadRequest(msg)) | Self::BadRequest(msg) => {
                AuthResponse::failure(msg.clone())
            }
            Self::Auth(AuthError::InvalidCredentials | AuthError::UserNotFound) => {
                AuthResponse::failure("Invalid credentials")
            }
            Self::Auth(AuthError::UserAlreadyExists { .. }) => {
                AuthResponse::failure("Email already exists")
            }
            Self::Auth(err @ AuthError::RateLimited { .. }) => AuthResponse::failure(err.to_string()),
            Self::MethodNotAllowed => AuthResponse::failure("Method not allowed"),
            Self::Auth(_) | Self::Internal(_) => AuthResponse::failure("Internal server error"),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
