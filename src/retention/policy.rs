use crate::storage::KeyValueStore;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Fixed key under which the directory mapping is persisted per account.
const AUTO_DELETE_KEY: &str = "app_folder_auto_delete";

/// Owns and persists the directory → days-to-keep mapping for one account.
///
/// The mapping is loaded from the backing key/value store at construction
/// and flushed back wholesale after every successful mutation. Failures are
/// absorbed: a missing or unparseable blob loads as an empty mapping, and
/// lookups against unknown directories return `0`.
pub struct RetentionPolicyStore<S: KeyValueStore> {
    backend: S,
    account: String,
    directories: HashMap<String, i64>,
}

impl<S: KeyValueStore> RetentionPolicyStore<S> {
    pub fn load(backend: S, account: impl Into<String>) -> Self {
        let account = account.into();
        let directories = match backend.value(&account, AUTO_DELETE_KEY) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Unparseable retention state for {}: {}", account, e);
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        Self {
            backend,
            account,
            directories,
        }
    }

    /// Registers `directory` to keep files for `offset_days` days,
    /// overwriting any previous registration (last write wins).
    ///
    /// Returns `false` without mutating or persisting when `directory` is
    /// empty or `offset_days` is not positive.
    pub fn add_directory(&mut self, directory: &str, offset_days: i64) -> bool {
        if directory.is_empty() || offset_days <= 0 {
            return false;
        }
        self.directories.insert(directory.to_string(), offset_days);
        self.persist();
        true
    }

    /// Removes the registration for `directory` if present.
    pub fn delete_directory(&mut self, directory: &str) -> bool {
        if directory.is_empty() || self.directories.remove(directory).is_none() {
            return false;
        }
        self.persist();
        true
    }

    pub fn is_directory_added(&self, directory: &str) -> bool {
        !directory.is_empty() && self.directories.contains_key(directory)
    }

    /// Returns the registered offset for `directory`, or `0` if absent.
    pub fn directory_offset(&self, directory: &str) -> i64 {
        self.directories.get(directory).copied().unwrap_or(0)
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.directories) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("Failed to serialize retention state: {}", e);
                return;
            }
        };
        if let Err(e) = self
            .backend
            .store_or_update(&self.account, AUTO_DELETE_KEY, &serialized)
        {
            error!("Failed to persist retention state for {}: {}", self.account, e);
        } else {
            debug!("Persisted retention state for {}", self.account);
        }
    }
}
