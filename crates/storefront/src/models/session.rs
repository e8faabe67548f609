//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brewhouse_core::SessionToken;

use super::user::Identity;

/// The logged-in customer of this view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSession {
    #[serde(flatten)]
    pub identity: Identity,
    /// Token issued by the auth API; absent for offline logins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SessionToken>,
    pub logged_in_at: DateTime<Utc>,
}

/// Logical keys used in the session store.
pub mod keys {
    /// The single offline account, including its password digest.
    pub const USER: &str = "user";

    /// The redacted identity of whoever is logged in.
    pub const CURRENT_USER: &str = "current_user";

    /// Cart lines.
    pub const CART: &str = "cart";

    /// Log of placed orders.
    pub const ORDERS: &str = "orders";
}
