//! Key-value persistence abstraction.
//!
//! This module defines the [`KeyValueStore`] trait the favorites and theme
//! stores persist through. It models a browser-style local storage: string
//! keys, string values, no schema and no versioning.
//!
//! Both stores share one backend through a [`SharedStore`] handle.

use crate::domain::error::{DexError, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// String key/value storage.
///
/// # Implementations
///
/// - [`JsonFileStore`](crate::storage::JsonFileStore): one JSON object on disk
/// - [`MemoryStore`](crate::storage::MemoryStore): process-local, for tests
///   and ephemeral runs
///
/// # Examples
///
/// ```
/// use pokedex::storage::{KeyValueStore, MemoryStore};
///
/// let mut store = MemoryStore::default();
/// store.set("pokemon-theme", "dark")?;
/// assert_eq!(store.get("pokemon-theme")?.as_deref(), Some("dark"));
/// # Ok::<(), pokedex::domain::DexError>(())
/// ```
pub trait KeyValueStore: Send {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key was never written or has been removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// The write is durable when this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// A key-value backend shared between stores.
pub type SharedStore = Arc<Mutex<dyn KeyValueStore>>;

/// Wraps a backend for sharing.
pub fn shared<S: KeyValueStore + 'static>(store: S) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Locks a shared backend.
///
/// # Errors
///
/// Returns [`DexError::Storage`] if a previous holder panicked.
pub fn lock(store: &SharedStore) -> Result<MutexGuard<'_, dyn KeyValueStore + 'static>> {
    store
        .lock()
        .map_err(|_| DexError::Storage("key-value store lock poisoned".to_string()))
}
