//! JSON-file-backed key-value store.
//!
//! The whole store is a single JSON object on disk, shared by every process
//! that opens the same path. Each write takes an exclusive lock on a sibling
//! `.lock` file, re-reads the object, applies its one key, and replaces the
//! file through a temporary sibling and a rename. Writers therefore never
//! drop each other's keys, and readers never see a half-written store.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tokio::sync::broadcast;

use super::{EVENT_CHANNEL_CAPACITY, KeyValueStore, StoreError, StoreEvent};

type Entries = BTreeMap<String, String>;

/// A store persisted to one JSON file.
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
    events: broadcast::Sender<StoreEvent>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if the file does not
    /// exist yet.
    ///
    /// A file that is not a JSON object of strings is moved aside to
    /// `<path>.corrupt` and the store starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file or its lock cannot be
    /// accessed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let store = Self {
            lock_path: sibling(&path, ".lock"),
            path,
            events,
        };

        let entries = store.read_shared()?;
        tracing::debug!(path = %store.path.display(), keys = entries.len(), "Opened file store");
        Ok(store)
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<File, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        Ok(file)
    }

    fn read_shared(&self) -> Result<Entries, StoreError> {
        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock)?;
        self.read_entries()
    }

    /// Apply `change` to the current contents under the exclusive lock,
    /// writing the file back only if `change` reports a modification.
    fn update(&self, change: impl FnOnce(&mut Entries) -> bool) -> Result<bool, StoreError> {
        let lock = self.lock_file()?;
        FileExt::lock_exclusive(&lock)?;

        let mut entries = self.read_entries()?;
        if !change(&mut entries) {
            return Ok(false);
        }
        self.flush(&entries)?;
        Ok(true)
    }

    fn read_entries(&self) -> Result<Entries, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(Entries::new());
        }

        match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                self.quarantine(&e)?;
                Ok(Entries::new())
            }
        }
    }

    fn quarantine(&self, cause: &serde_json::Error) -> Result<(), StoreError> {
        let target = sibling(&self.path, ".corrupt");
        tracing::warn!(
            path = %self.path.display(),
            moved_to = %target.display(),
            error = %cause,
            "Store file is corrupted; starting empty"
        );
        match fs::rename(&self.path, &target) {
            Ok(()) => Ok(()),
            // Another reader already moved it.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&self, entries: &Entries) -> Result<(), StoreError> {
        let tmp = sibling(&self.path, ".tmp");
        let bytes = serde_json::to_vec_pretty(entries)?;
        if let Err(e) = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn notify(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(OsStr::new(suffix));
    PathBuf::from(name)
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_shared()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
            true
        })?;
        self.notify(StoreEvent::Set {
            key: key.to_owned(),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.update(|entries| entries.remove(key).is_some())? {
            self.notify(StoreEvent::Removed {
                key: key.to_owned(),
            });
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_shared()?.into_keys().collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set("cs_user", "{\"value\":1}").unwrap();
        store.set("cs_cart", "[]").unwrap();
        store.remove("cs_cart").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("cs_user").unwrap().as_deref(),
            Some("{\"value\":1}")
        );
        assert_eq!(reopened.get("cs_cart").unwrap(), None);
    }

    #[test]
    fn test_corrupted_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("store.json.corrupt")).unwrap(),
            "not json"
        );

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_handles_on_one_file_keep_each_others_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let first = FileStore::open(&path).unwrap();
        let second = FileStore::open(&path).unwrap();

        first.set("cs_cart", "[1]").unwrap();
        assert_eq!(second.get("cs_cart").unwrap().as_deref(), Some("[1]"));

        second.set("theme", "dark").unwrap();
        second.remove("cs_missing").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.keys().unwrap(),
            vec!["cs_cart".to_string(), "theme".to_string()]
        );
    }

    #[test]
    fn test_set_notifies_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        let mut events = store.subscribe();
        store.set("k", "v").unwrap();
        assert_eq!(events.try_recv().unwrap().key(), "k");
    }

    #[test]
    fn test_removing_missing_key_sends_no_event() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        let mut events = store.subscribe();
        store.remove("absent").unwrap();
        assert!(events.try_recv().is_err());
    }
}
