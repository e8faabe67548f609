//! User repository.

use brewhouse_core::Email;

use super::{Database, RepositoryError};
use crate::models::Identity;

/// A stored account.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub identity: Identity,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered
    /// (compared case-insensitively).
    pub fn create(&self, identity: Identity, password_hash: String) -> Result<Identity, RepositoryError> {
        let key = identity.email.normalized();
        let mut users = self.db.users.write();

        if users.contains_key(&key) {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                identity.email.redacted()
            )));
        }

        users.insert(
            key,
            UserRecord {
                identity: identity.clone(),
                password_hash,
            },
        );
        Ok(identity)
    }

    /// Get a user by email.
    #[must_use]
    pub fn get_by_email(&self, email: &Email) -> Option<Identity> {
        self.db
            .users
            .read()
            .get(&email.normalized())
            .map(|record| record.identity.clone())
    }

    /// Get a user together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored hash is empty.
    pub fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Identity, String)>, RepositoryError> {
        let users = self.db.users.read();
        let Some(record) = users.get(&email.normalized()) else {
            return Ok(None);
        };

        if record.password_hash.is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "missing password hash for {}",
                record.identity.email.redacted()
            )));
        }

        Ok(Some((record.identity.clone(), record.password_hash.clone())))
    }

    /// Number of registered users.
    #[must_use]
    pub fn count(&self) -> usize {
        self.db.users.read().len()
    }
}
