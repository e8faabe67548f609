//! Wire types of the authentication endpoint (`POST /api/auth`).

use std::fmt;

use serde::{Deserialize, Serialize};

use brewhouse_core::{AuthAction, Field, SessionToken};

use super::user::Identity;

/// Request body, discriminated by its `action` field.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AuthRequest {
    Register(RegisterRequest),
    Login(LoginRequest),
}

impl AuthRequest {
    /// Which action this request performs.
    #[must_use]
    pub const fn action(&self) -> AuthAction {
        match self {
            Self::Register(_) => AuthAction::Register,
            Self::Login(_) => AuthAction::Login,
        }
    }
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(r) => f.debug_tuple("Register").field(r).finish(),
            Self::Login(r) => f.debug_tuple("Login").field(r).finish(),
        }
    }
}

/// Fields of a registration request. Missing fields deserialize as empty.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Fields of a login request.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response body for every outcome, success or failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SessionToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Form field a validation error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

impl AuthResponse {
    /// A successful response carrying the identity and a fresh token.
    #[must_use]
    pub fn authenticated(user: Identity, token: SessionToken, message: impl Into<String>) -> Self {
        Self {
            success: true,
            user: Some(user),
            token: Some(token),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// A failure response.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// A validation failure pointing at one form field.
    #[must_use]
    pub fn invalid(field: Field, error: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            ..Self::failure(error)
        }
    }
}
