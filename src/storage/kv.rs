use crate::error::StorageError;
use crate::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persistent key/value storage scoped to an account identity.
///
/// The retention core reads one blob at construction and rewrites it
/// wholesale on every mutation; nothing else is required of the backend.
pub trait KeyValueStore {
    /// Returns the stored value for `(account, key)`, or `None` if absent.
    fn value(&self, account: &str, key: &str) -> Option<String>;

    /// Stores or replaces the value for `(account, key)`.
    fn store_or_update(&self, account: &str, key: &str, value: &str) -> Result<()>;
}

/// File-backed [`KeyValueStore`]: one JSON object per account under a
/// state directory, mapping keys to string values.
pub struct FileKeyValueStore {
    state_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Result<Self> {
        let state_dir = state_dir.into();
        fs::create_dir_all(&state_dir).map_err(StorageError::DirectoryCreation)?;
        Ok(Self { state_dir })
    }

    fn account_file(&self, account: &str) -> PathBuf {
        // Account names may contain path-hostile characters; encode them.
        self.state_dir
            .join(format!("{}.json", urlencoding::encode(account)))
    }

    fn read_map(&self, path: &Path) -> HashMap<String, String> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                // A file that does not exist yet is the normal empty state.
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("{} ({:?})", StorageError::FileRead(e), path);
                }
                return HashMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!("Discarding unparseable state file {:?}: {}", path, e);
                HashMap::new()
            }
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn value(&self, account: &str, key: &str) -> Option<String> {
        let path = self.account_file(account);
        self.read_map(&path).remove(key)
    }

    fn store_or_update(&self, account: &str, key: &str, value: &str) -> Result<()> {
        let path = self.account_file(account);
        let mut map = self.read_map(&path);
        map.insert(key.to_string(), value.to_string());
        let serialized = serde_json::to_string(&map).map_err(StorageError::Serialization)?;
        fs::write(&path, serialized).map_err(StorageError::FileWrite)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_account_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();
        assert_eq!(store.value("user@cloud.example.org", "some_key"), None);
    }

    #[test]
    fn stored_value_survives_a_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileKeyValueStore::new(dir.path()).unwrap();
            store
                .store_or_update("user@cloud.example.org", "some_key", "some value")
                .unwrap();
        }
        let store = FileKeyValueStore::new(dir.path()).unwrap();
        assert_eq!(
            store.value("user@cloud.example.org", "some_key").as_deref(),
            Some("some value")
        );
    }

    #[test]
    fn corrupt_account_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();
        store
            .store_or_update("user@cloud.example.org", "some_key", "value")
            .unwrap();
        let path = store.account_file("user@cloud.example.org");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(store.value("user@cloud.example.org", "some_key"), None);
    }

    #[test]
    fn unreadable_state_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();
        // A directory squatting on the state file path makes every read
        // fail with something other than NotFound.
        fs::create_dir(store.account_file("user@cloud.example.org")).unwrap();
        assert_eq!(store.value("user@cloud.example.org", "some_key"), None);
    }

    #[test]
    fn accounts_do_not_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();
        store
            .store_or_update("alice@cloud.example.org", "some_key", "a")
            .unwrap();
        store
            .store_or_update("bob@cloud.example.org", "some_key", "b")
            .unwrap();
        assert_eq!(
            store.value("alice@cloud.example.org", "some_key").as_deref(),
            Some("a")
        );
        assert_eq!(
            store.value("bob@cloud.example.org", "some_key").as_deref(),
            Some("b")
        );
    }
}
