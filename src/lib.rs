//! Pokédex explorer: a catalog client for the public PokeAPI.
//!
//! The crate lists, searches, filters by type, sorts and paginates Pokémon,
//! keeps a persisted set of favorites and a light/dark theme flag, and shows
//! per-entity details. It has no backend of its own; everything comes from
//! the remote API, and local state is a small key-value file.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs)                                      │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - URL state adapter     - Event handling           │
//! │  - List assembly engine  - Explorer (query glue)    │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Storage Layer │   │ Query Layer   │
//! │ (ui/)         │   │ (storage/)    │   │ (query/)      │
//! │ - View models │   │ - Key-value   │   │ - Cache/dedup │
//! │ - Palettes    │   │ - Favorites   │   │ - Retry       │
//! │ - Renderer    │   │ - Theme       │   │ - Debounce    │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  API (api/), Domain (domain/), Infrastructure       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`api`]: remote data source trait and the reqwest client
//! - [`app`]: view state, list assembly, explorer and event handling
//! - [`domain`]: entity models and error types
//! - [`infrastructure`]: platform paths
//! - [`observability`]: file-based `tracing` setup
//! - [`query`]: request caching, retry, stale-result handling, debouncing
//! - [`storage`]: key-value persistence, favorites and theme stores
//! - [`ui`]: view models, palettes and the text renderer
//!
//! # Configuration
//!
//! ```toml
//! # ~/.config/pokedex/config.toml
//! base_url = "https://pokeapi.co/api/v2"
//! data_dir = "~/.local/share/pokedex"
//! trace_level = "debug"
//! name_index_limit = 1000
//! retry_base_delay_ms = 1000
//! theme_file = "~/.config/pokedex/my-palette.toml"
//! ```
//!
//! `POKEDEX_BASE_URL`, `POKEDEX_DATA_DIR` and `POKEDEX_TRACE_LEVEL` override
//! the file.

#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod query;
pub mod storage;
pub mod ui;

pub use app::{handle_event, Action, AppState, Event, Explorer, ExplorerSettings};
pub use domain::{DexError, Result};

use crate::api::{DataSource, PokeApiClient, DEFAULT_BASE_URL};
use crate::app::explorer::DEFAULT_NAME_INDEX_LIMIT;
use crate::app::url_state::AddressableState;
use crate::storage::{shared, FavoritesStore, JsonFileStore, MemoryStore, SharedStore, ThemeMode, ThemeStore};
use crate::ui::Palette;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable overriding [`Config::base_url`].
pub const ENV_BASE_URL: &str = "POKEDEX_BASE_URL";
/// Environment variable overriding [`Config::data_dir`].
pub const ENV_DATA_DIR: &str = "POKEDEX_DATA_DIR";
/// Environment variable overriding [`Config::trace_level`].
pub const ENV_TRACE_LEVEL: &str = "POKEDEX_TRACE_LEVEL";

/// Application configuration.
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root URL of the PokeAPI. Default: `https://pokeapi.co/api/v2`
    pub base_url: String,

    /// Directory for the key-value store and the log file. `~` is expanded.
    /// Default: `~/.local/share/pokedex`
    pub data_dir: Option<String>,

    /// Log level or `EnvFilter` directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// Size of the name index searched client-side. Default: 1000
    pub name_index_limit: u32,

    /// Base delay of the retry back-off in milliseconds. Default: 1000
    pub retry_base_delay_ms: u64,

    /// Custom palette TOML used instead of the bundled light/dark palettes.
    pub theme_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: None,
            trace_level: None,
            name_index_limit: DEFAULT_NAME_INDEX_LIMIT,
            retry_base_delay_ms: 1000,
            theme_file: None,
        }
    }
}

impl Config {
    /// Parses a TOML config document.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Config`] on invalid TOML, wrong value types or
    /// unknown keys.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pokedex::Config;
    ///
    /// let config = Config::from_toml_str("name_index_limit = 151")?;
    /// assert_eq!(config.name_index_limit, 151);
    /// assert_eq!(config.base_url, "https://pokeapi.co/api/v2");
    /// # Ok::<(), pokedex::DexError>(())
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| DexError::Config(format!("invalid config: {e}")))
    }

    /// Loads the config file, then applies environment overrides.
    ///
    /// With `path = None` the default location is used and a missing file
    /// means defaults. An explicitly given path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or any file cannot
    /// be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (infrastructure::default_config_path(), false),
        };

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&contents)?
        } else if required {
            return Err(DexError::Config(format!("config file not found: {}", path.display())));
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `POKEDEX_*` overrides read through `lookup`. Empty values are
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(dir);
        }
        if let Some(level) = get(ENV_TRACE_LEVEL) {
            self.trace_level = Some(level);
        }
    }

    /// Resolved data directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(infrastructure::get_data_dir, infrastructure::expand_tilde)
    }

    #[must_use]
    pub fn explorer_settings(&self) -> ExplorerSettings {
        ExplorerSettings {
            name_index_limit: self.name_index_limit.max(1),
            ..ExplorerSettings::default()
        }
        .with_retry_base_delay(Duration::from_millis(self.retry_base_delay_ms))
    }

    /// Palette for `mode`: the custom file if configured and valid, else the
    /// bundled one.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled palette is unusable.
    pub fn palette(&self, mode: ThemeMode) -> Result<Palette> {
        if let Some(file) = &self.theme_file {
            match Palette::from_file(infrastructure::expand_tilde(file)) {
                Ok(palette) => return Ok(palette),
                Err(e) => {
                    tracing::debug!(theme_file = %file, error = %e, "failed to load palette, using bundled");
                }
            }
        }
        Palette::for_mode(mode)
    }
}

/// Opens the key-value backend: the JSON file in the data directory, or
/// memory when `ephemeral`.
///
/// # Errors
///
/// Returns an error if the data directory or store file cannot be used.
pub fn open_store(config: &Config, ephemeral: bool) -> Result<SharedStore> {
    if ephemeral {
        tracing::debug!("using in-memory store");
        return Ok(shared(MemoryStore::default()));
    }
    Ok(shared(JsonFileStore::in_dir(&config.data_dir())?))
}

/// Builds the explorer on the real API client.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_explorer(config: &Config) -> Result<Explorer> {
    let client = PokeApiClient::new(config.base_url.clone())?;
    let source: Arc<dyn DataSource> = Arc::new(client);
    Ok(Explorer::new(source, config.explorer_settings()))
}

/// Initializes application state on `location` with stores read from
/// `backend`.
///
/// # Errors
///
/// Returns an error if the persisted stores cannot be read.
pub fn initialize<S: AddressableState>(location: S, backend: &SharedStore) -> Result<AppState<S>> {
    tracing::debug!("initializing pokedex state");
    let favorites = FavoritesStore::load(Arc::clone(backend))?;
    let theme = ThemeStore::load(Arc::clone(backend))?;
    Ok(AppState::new(location, favorites, theme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("scan_depth = 4").unwrap_err();
        assert!(matches!(err, DexError::Config(_)));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::from_toml_str("base_url = \"http://file\"\ntrace_level = \"warn\"").unwrap();
        config.apply_overrides(|key| match key {
            ENV_BASE_URL => Some("http://env".to_string()),
            ENV_TRACE_LEVEL => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://env");
        assert_eq!(config.trace_level.as_deref(), Some("warn"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn data_dir_expands_and_retry_delay_applies() {
        let config = Config {
            data_dir: Some("/tmp/dex".into()),
            retry_base_delay_ms: 5,
            ..Config::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/dex"));
        assert_eq!(
            config.explorer_settings().retry.delay_for(0),
            Some(Duration::from_millis(5))
        );
    }
}
