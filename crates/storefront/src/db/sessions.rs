//! Session-token repository.

use chrono::{DateTime, Utc};

use brewhouse_core::{SessionToken, UserId};

use super::{Database, RepositoryError};

/// An issued session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Repository for session-token operations.
pub struct SessionRepository<'a> {
    db: &'a Database,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Store a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the token is already in use.
    pub fn create(
        &self,
        token: &SessionToken,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.db.sessions.write();
        if sessions.contains_key(token.as_str()) {
            return Err(RepositoryError::Conflict("session token collision".to_string()));
        }
        sessions.insert(
            token.as_str().to_owned(),
            SessionRecord {
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    /// Delete every token expired at `now`. Returns how many were deleted.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.db.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, record| now < record.expires_at);
        before - sessions.len()
    }
}
