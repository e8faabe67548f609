//! Expiring, namespaced JSON entries over a [`KeyValueStore`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::{KeyValueStore, StoreEvent};
use crate::clock::{Clock, SystemClock};

/// Prefix applied to every key written by a [`SessionStore`].
pub const KEY_PREFIX: &str = "cs_";

/// How long an entry stays readable after it is written.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Expiry stamp of entries written with [`SessionStore::put_persistent`].
pub const NEVER_EXPIRES: i64 = i64::MAX;

/// A stored value with its creation and expiry times (epoch milliseconds).
///
/// `expires == timestamp + timeout` for the store that wrote it, or
/// [`NEVER_EXPIRES`] for persistent entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
    pub timestamp: i64,
    pub expires: i64,
}

impl<T> Envelope<T> {
    /// Whether the entry can no longer be read at `now_millis`.
    #[must_use]
    pub const fn is_expired(&self, now_millis: i64) -> bool {
        now_millis >= self.expires
    }
}

/// Envelope with the value left undecoded, for sweeping entries of any type.
#[derive(Deserialize)]
struct RawEnvelope {
    #[allow(dead_code)]
    value: serde_json::Value,
    #[allow(dead_code)]
    timestamp: i64,
    expires: i64,
}

/// Durable key-value storage with absolute per-entry expiry.
///
/// Storage failures never reach the caller: writes report `false`, reads
/// report `None`, and the failure is logged. Corrupted and expired entries
/// are deleted the moment they are read.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    timeout_millis: i64,
}

impl SessionStore {
    /// Create a store over `backend` using the system clock and the default
    /// 24 hour timeout.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    /// Create a store over `backend` reading time from `clock`.
    pub fn with_clock(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            timeout_millis: duration_millis(DEFAULT_SESSION_TIMEOUT),
        }
    }

    /// Replace the session timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_millis = duration_millis(timeout);
        self
    }

    /// The session timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.timeout_millis).unwrap_or(u64::MAX))
    }

    /// The clock entries are stamped with.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The namespaced key a logical key is stored under.
    #[must_use]
    pub fn storage_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }

    /// The logical key for a raw storage key, if it belongs to this store.
    #[must_use]
    pub fn logical_key(raw: &str) -> Option<&str> {
        raw.strip_prefix(KEY_PREFIX)
    }

    /// Store `value` under `key` with a fresh expiry.
    ///
    /// Returns `false` if the value could not be serialized or written.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let now = self.clock.now_millis();
        self.write(key, value, now, now.saturating_add(self.timeout_millis))
    }

    /// Store `value` under `key` with no expiry.
    ///
    /// For records that outlive the session, such as the order log. Sweeps
    /// and reads never delete the entry for age.
    pub fn put_persistent<T: Serialize>(&self, key: &str, value: &T) -> bool {
        self.write(key, value, self.clock.now_millis(), NEVER_EXPIRES)
    }

    fn write<T: Serialize>(&self, key: &str, value: &T, timestamp: i64, expires: i64) -> bool {
        let envelope = Envelope {
            value,
            timestamp,
            expires,
        };

        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize session entry");
                return false;
            }
        };

        match self.backend.set(&Self::storage_key(key), &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to write session entry");
                false
            }
        }
    }

    /// Read the value under `key`.
    ///
    /// Returns `None` if the entry is missing, unreadable, corrupted, or
    /// expired; the last two are deleted.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.envelope(key).map(|envelope| envelope.value)
    }

    /// Read the full envelope under `key`, applying the same expiry rules as
    /// [`get`](Self::get).
    pub fn envelope<T: DeserializeOwned>(&self, key: &str) -> Option<Envelope<T>> {
        let storage_key = Self::storage_key(key);
        let raw = match self.backend.get(&storage_key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read session entry");
                return None;
            }
        };

        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding corrupted session entry");
                self.discard(&storage_key);
                return None;
            }
        };

        if envelope.is_expired(self.clock.now_millis()) {
            tracing::debug!(key, "Session entry expired");
            self.discard(&storage_key);
            return None;
        }

        Some(envelope)
    }

    /// Delete the entry under `key`.
    ///
    /// Returns `false` only if the backend rejected the delete.
    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove(&Self::storage_key(key)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to remove session entry");
                false
            }
        }
    }

    /// Delete every namespaced entry that is malformed or expired.
    ///
    /// Keys without the namespace prefix are left alone. Returns the number
    /// of entries deleted.
    pub fn sweep_expired(&self) -> usize {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list session entries");
                return 0;
            }
        };

        let now = self.clock.now_millis();
        let mut swept = 0;

        for storage_key in keys.iter().filter(|k| k.starts_with(KEY_PREFIX)) {
            let stale = match self.backend.get(storage_key) {
                Ok(Some(raw)) => serde_json::from_str::<RawEnvelope>(&raw)
                    .ok()
                    .is_none_or(|envelope| now >= envelope.expires),
                Ok(None) => false,
                Err(e) => {
                    tracing::warn!(key = %storage_key, error = %e, "Failed to read session entry");
                    false
                }
            };

            if stale && self.discard(storage_key) {
                swept += 1;
            }
        }

        if swept > 0 {
            tracing::info!(swept, "Swept stale session entries");
        }
        swept
    }

    /// Subscribe to changes in the underlying store.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.backend.subscribe()
    }

    fn discard(&self, storage_key: &str) -> bool {
        match self.backend.remove(storage_key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %storage_key, error = %e, "Failed to delete stale session entry");
                false
            }
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("clock", &self.clock)
            .field("timeout_millis", &self.timeout_millis)
            .finish_non_exhaustive()
    }
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
