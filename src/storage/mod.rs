//! Local persistence for favorites and the theme flag.
//!
//! Both stores sit on top of a string key-value backend that mirrors browser
//! local storage: a JSON file on disk, or memory for tests.
//!
//! # Modules
//!
//! - `backend`: [`KeyValueStore`] trait and the shared handle type
//! - `json`: JSON file-based backend with atomic writes
//! - `memory`: in-memory backend
//! - `favorites`: favorites map with write-through persistence
//! - `theme`: light/dark flag with write-through persistence

pub mod backend;
pub mod favorites;
pub mod json;
pub mod memory;
pub mod theme;

pub use backend::{lock, shared, KeyValueStore, SharedStore};
pub use favorites::{FavoritesSet, FavoritesStore, FAVORITES_KEY};
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use theme::{ThemeMode, ThemeStore, THEME_KEY};
