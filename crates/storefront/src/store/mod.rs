//! Key-value persistence.
//!
//! # Layers
//!
//! - [`KeyValueStore`] - the raw string store the client runs on (the
//!   browser-storage analogue). Implementations: [`MemoryStore`] and
//!   [`FileStore`].
//! - [`SessionStore`] - namespaced, JSON-serialized entries wrapped in an
//!   expiring [`Envelope`]. Callers never see storage errors; they get
//!   `bool`/`Option` results instead.
//!
//! Every store publishes a [`StoreEvent`] after each write so that several
//! views over the same store can converge on the latest state.

pub mod file;
pub mod memory;
pub mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::{DEFAULT_SESSION_TIMEOUT, Envelope, KEY_PREFIX, NEVER_EXPIRES, SessionStore};

use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of each store's change-notification channel.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend refuses all access (disabled or private-mode storage).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the backend's quota.
    #[error("storage quota exceeded ({limit} bytes)")]
    QuotaExceeded {
        /// Quota in bytes.
        limit: usize,
    },

    /// The backing file could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded.
    #[error("corrupted storage data: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// A change to a stored key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The key was written.
    Set { key: String },
    /// The key was deleted.
    Removed { key: String },
}

impl StoreEvent {
    /// The raw key that changed.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key } | Self::Removed { key } => key,
        }
    }
}

/// An unordered string key-value store with change notifications.
///
/// No transactions and no compare-and-swap: the last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend rejects the delete.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// List every stored key.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Subscribe to changes made through this store or any of its clones.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
