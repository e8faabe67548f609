//! Authentication error types.

use thiserror::Error;

use brewhouse_core::ValidationError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A form field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Too many failed logins for this email.
    #[error("too many login attempts, try again in {retry_after_minutes} minutes")]
    RateLimited {
        /// Whole minutes until the lock lifts (at least 1).
        retry_after_minutes: i64,
    },

    /// No account for this email.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with {email} already exists")]
    UserAlreadyExists {
        /// Redacted email.
        email: String,
    },

    /// The session could not be persisted.
    #[error("session storage unavailable")]
    StorageUnavailable,

    /// The auth service rejected the request shape.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The auth service could not be reached.
    #[error("auth service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The auth service answered with an unexpected status.
    #[error("auth service error ({status}): {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Repository error on the auth API side.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether this is a wrong-email or wrong-password failure, the kind that
    /// counts towards the login rate limit.
    #[must_use]
    pub const fn is_credential_failure(&self) -> bool {
        matches!(self, Self::UserNotFound | Self::InvalidCredentials)
    }
}
