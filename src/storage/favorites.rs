//! Persisted favorites.
//!
//! Favorites are a map from entity id (as a string) to a presence flag,
//! stored as JSON text under [`FAVORITES_KEY`]. Un-starring writes `false`
//! rather than removing the entry, so a toggled-twice id stays in the map.

use crate::domain::error::{DexError, Result};
use crate::storage::backend::{lock, SharedStore};
use std::collections::BTreeMap;

/// Key the favorites blob is stored under.
pub const FAVORITES_KEY: &str = "pokemon-favorites";

/// Snapshot of the favorites map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesSet {
    entries: BTreeMap<String, bool>,
}

impl FavoritesSet {
    /// Parses the persisted JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Storage`] if `json` is not an object of booleans.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries = serde_json::from_str(json)
            .map_err(|e| DexError::Storage(format!("malformed favorites: {e}")))?;
        Ok(Self { entries })
    }

    /// Serializes to the persisted JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Storage`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.entries)
            .map_err(|e| DexError::Storage(format!("failed to serialize favorites: {e}")))
    }

    /// Whether `id` is starred. Unknown ids and `false` entries are not.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Like [`contains`](Self::contains) for a numeric id.
    #[must_use]
    pub fn contains_id(&self, id: u32) -> bool {
        self.contains(&id.to_string())
    }

    /// Flips membership of `id` and returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        let now = !self.contains(id);
        self.entries.insert(id.to_string(), now);
        now
    }

    /// Raw flag stored for `id`, distinguishing "never starred" (`None`)
    /// from "un-starred" (`Some(false)`).
    #[must_use]
    pub fn flag(&self, id: &str) -> Option<bool> {
        self.entries.get(id).copied()
    }

    /// Starred ids, in key order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, starred)| **starred)
            .map(|(id, _)| id.as_str())
    }

    /// Number of starred ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Into<String>> FromIterator<S> for FavoritesSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|id| (id.into(), true)).collect(),
        }
    }
}

/// Favorites with write-through persistence.
pub struct FavoritesStore {
    backend: SharedStore,
    set: FavoritesSet,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore").field("set", &self.set).finish_non_exhaustive()
    }
}

impl FavoritesStore {
    /// Initializes from the persisted blob.
    ///
    /// A missing or malformed blob yields an empty set; malformed data is
    /// logged and left in place until the next toggle overwrites it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself cannot be read.
    pub fn load(backend: SharedStore) -> Result<Self> {
        let raw = lock(&backend)?.get(FAVORITES_KEY)?;
        let set = match raw {
            None => FavoritesSet::default(),
            Some(json) => FavoritesSet::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring persisted favorites");
                FavoritesSet::default()
            }),
        };
        tracing::debug!(count = set.len(), "favorites loaded");
        Ok(Self { backend, set })
    }

    /// Flips membership of `id`, persists, and returns the new membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the new map cannot be persisted; the in-memory
    /// set is left unchanged in that case.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let _span = tracing::debug_span!("toggle_favorite", id = %id).entered();

        let mut next = self.set.clone();
        let starred = next.toggle(id);
        lock(&self.backend)?.set(FAVORITES_KEY, &next.to_json()?)?;
        self.set = next;

        tracing::info!(id = %id, starred, "favorite toggled");
        Ok(starred)
    }

    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    /// Current favorites snapshot.
    #[must_use]
    pub fn set(&self) -> &FavoritesSet {
        &self.set
    }
}
