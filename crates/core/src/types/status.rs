//! Status enums for authentication state and API actions.

use serde::{Deserialize, Serialize};

/// Whether a view currently has a logged-in customer.
///
/// Transitions: `LoggedOut -> LoggedIn` on login or registration,
/// `LoggedIn -> LoggedOut` on logout or session expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    LoggedOut,
    LoggedIn,
}

/// Action requested from the remote authentication endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthAction {
    Register,
    Login,
}

impl std::fmt::Display for AuthAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register => write!(f, "register"),
            Self::Login => write!(f, "login"),
        }
    }
}

impl std::str::FromStr for AuthAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(Self::Register),
            "login" => Ok(Self::Login),
            _ => Err(format!("invalid action: {s}")),
        }
    }
}
