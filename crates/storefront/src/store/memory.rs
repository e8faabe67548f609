//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::{EVENT_CHANNEL_CAPACITY, KeyValueStore, StoreError, StoreEvent};

/// A process-local store.
///
/// Clones share the same entries and the same notification channel, which
/// makes two clones behave like two open views of one storage area.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    available: AtomicBool,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    /// Create an empty store without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an empty store that rejects writes once keys plus values
    /// exceed `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self::build(Some(quota_bytes))
    }

    fn build(quota_bytes: Option<usize>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(MemoryInner {
                entries: RwLock::new(HashMap::new()),
                quota_bytes,
                available: AtomicBool::new(true),
                events,
            }),
        }
    }

    /// Simulate storage being disabled (or re-enabled).
    ///
    /// While unavailable every operation fails with
    /// [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// Write a raw value without notifying subscribers, as another process
    /// sharing the storage would.
    pub fn set_raw(&self, key: &str, value: &str) {
        self.inner
            .entries
            .write()
            .insert(key.to_owned(), value.to_owned());
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("storage is disabled".to_string()))
        }
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys", &self.len())
            .field("quota_bytes", &self.inner.quota_bytes)
            .finish_non_exhaustive()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_available()?;
        Ok(self.inner.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        {
            let mut entries = self.inner.entries.write();

            if let Some(limit) = self.inner.quota_bytes {
                let used: usize = entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                if used + key.len() + value.len() > limit {
                    return Err(StoreError::QuotaExceeded { limit });
                }
            }

            entries.insert(key.to_owned(), value.to_owned());
        }
        self.notify(StoreEvent::Set {
            key: key.to_owned(),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        let removed = self.inner.entries.write().remove(key).is_some();
        if removed {
            self.notify(StoreEvent::Removed {
                key: key.to_owned(),
            });
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_available()?;
        Ok(self.inner.entries.read().keys().cloned().collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }
}
