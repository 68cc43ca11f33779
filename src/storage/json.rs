//! JSON file-based key-value store.
//!
//! All keys live in a single JSON object of string values, rewritten in full
//! on every change using atomic file writes (write-to-temp + rename) so a
//! crash never leaves a half-written file behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "pokemon-favorites": "{\"25\":true,\"4\":false}",
//!   "pokemon-theme": "dark"
//! }
//! ```

use crate::domain::error::{DexError, Result};
use crate::storage::backend::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "local-storage.json";

/// Key-value store persisted as one JSON object on disk.
///
/// The whole map is held in memory; reads never touch the file.
///
/// # Thread Safety
///
/// This type is `Send` but not `Sync`. Share it through
/// [`SharedStore`](crate::storage::SharedStore).
#[derive(Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
    data: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `<data_dir>/local-storage.json`.
    ///
    /// # Errors
    ///
    /// See [`JsonFileStore::new`].
    pub fn in_dir(data_dir: &Path) -> Result<Self> {
        Self::new(data_dir.join(STORE_FILE_NAME))
    }

    /// Creates or opens a store backed by `file_path`.
    ///
    /// Parent directories are created automatically. A file that exists but
    /// is not a JSON object of strings is logged and treated as empty; it is
    /// only replaced by the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - The file exists but cannot be read
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pokedex::storage::JsonFileStore;
    /// use std::path::PathBuf;
    ///
    /// let store = JsonFileStore::new(PathBuf::from("/tmp/pokedex/local-storage.json"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "opening key-value store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty store");
            BTreeMap::new()
        };

        tracing::debug!(keys = data.len(), "key-value store ready");

        Ok(Self { file_path, data })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<String, String>> {
        let contents = std::fs::read_to_string(path)?;
        match serde_json::from_str(&contents) {
            Ok(data) => Ok(data),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "ignoring malformed key-value store");
                Ok(BTreeMap::new())
            }
        }
    }

    /// Writes `data` to disk; the in-memory map is only replaced once this
    /// succeeds.
    fn save_to_file(&self, data: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| DexError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::trace!(path = ?self.file_path, "key-value store saved");
        Ok(())
    }

    fn commit(&mut self, data: BTreeMap<String, String>) -> Result<()> {
        if let Err(e) = self.save_to_file(&data) {
            tracing::warn!(path = ?self.file_path, error = %e, "write failed, keeping previous values");
            return Err(e);
        }
        self.data = data;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _span = tracing::debug_span!("kv_set", key = %key).entered();

        if self.data.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let mut next = self.data.clone();
        next.insert(key.to_string(), value.to_string());
        self.commit(next)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let _span = tracing::debug_span!("kv_remove", key = %key).entered();

        if !self.data.contains_key(key) {
            return Ok(());
        }
        let mut next = self.data.clone();
        next.remove(key);
        self.commit(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = JsonFileStore::in_dir(dir.path()).unwrap();
            store.set("pokemon-theme", "dark").unwrap();
            store.set("pokemon-favorites", "{\"25\":true}").unwrap();
            store.remove("pokemon-theme").unwrap();
        }

        let store = JsonFileStore::in_dir(dir.path()).unwrap();
        assert_eq!(store.get("pokemon-theme").unwrap(), None);
        assert_eq!(
            store.get("pokemon-favorites").unwrap().as_deref(),
            Some("{\"25\":true}")
        );
        assert!(!dir.path().join("local-storage.tmp").exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut store = JsonFileStore::in_dir(&nested).unwrap();
        store.set("k", "v").unwrap();
        assert!(nested.join(STORE_FILE_NAME).exists());
    }

    #[test]
    fn failed_write_leaves_values_unchanged() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let mut store = JsonFileStore::in_dir(&data_dir).unwrap();
        store.set("pokemon-theme", "light").unwrap();

        std::fs::remove_dir_all(&data_dir).unwrap();
        assert!(store.set("pokemon-theme", "dark").is_err());
        assert_eq!(store.get("pokemon-theme").unwrap().as_deref(), Some("light"));

        std::fs::create_dir_all(&data_dir).unwrap();
        drop(store);
        assert!(!data_dir.join(STORE_FILE_NAME).exists());
    }

    #[test]
    fn malformed_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(STORE_FILE_NAME), "not json").unwrap();

        let mut store = JsonFileStore::in_dir(dir.path()).unwrap();
        assert_eq!(store.get("pokemon-theme").unwrap(), None);

        store.set("pokemon-theme", "light").unwrap();
        let reopened = JsonFileStore::in_dir(dir.path()).unwrap();
        assert_eq!(reopened.get("pokemon-theme").unwrap().as_deref(), Some("light"));
    }
}
