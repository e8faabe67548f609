//! Storage for the auth API.
//!
//! # Tables
//!
//! - `users` - accounts keyed by lower-cased email, with Argon2 hashes
//! - `sessions` - issued session tokens and their expiry, kept unique and
//!   purged once expired
//!
//! Both live in process memory behind [`Database`]; repositories borrow it
//! the way they would borrow a connection pool.

pub mod sessions;
pub mod users;

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use sessions::SessionRecord;
use users::UserRecord;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Stored data is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// In-memory tables.
#[derive(Debug, Default)]
pub struct Database {
    users: RwLock<HashMap<String, UserRecord>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
