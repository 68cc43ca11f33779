//! Persisted light/dark theme flag.

use crate::domain::error::Result;
use crate::storage::backend::{lock, SharedStore};
use std::fmt;
use std::str::FromStr;

/// Key the theme flag is stored under.
pub const THEME_KEY: &str = "pokemon-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme \"{other}\" (expected light or dark)")),
        }
    }
}

/// Theme flag with write-through persistence.
pub struct ThemeStore {
    backend: SharedStore,
    mode: ThemeMode,
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore").field("mode", &self.mode).finish_non_exhaustive()
    }
}

impl ThemeStore {
    /// Initializes from the persisted flag; anything but `dark` means light.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn load(backend: SharedStore) -> Result<Self> {
        let mode = lock(&backend)?
            .get(THEME_KEY)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        tracing::debug!(theme = %mode, "theme loaded");
        Ok(Self { backend, mode })
    }

    #[must_use]
    pub fn get(&self) -> ThemeMode {
        self.mode
    }

    /// Sets and persists the theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be persisted.
    pub fn set(&mut self, mode: ThemeMode) -> Result<()> {
        lock(&self.backend)?.set(THEME_KEY, mode.as_str())?;
        self.mode = mode;
        tracing::info!(theme = %mode, "theme changed");
        Ok(())
    }

    /// Switches light/dark, persists, and returns the new theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be persisted.
    pub fn toggle(&mut self) -> Result<ThemeMode> {
        let next = self.mode.toggled();
        self.set(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{shared, MemoryStore};

    #[test]
    fn unknown_value_falls_back_to_light() {
        let backend = shared(MemoryStore::with_entries([(THEME_KEY, "sepia")]));
        assert_eq!(ThemeStore::load(backend).unwrap().get(), ThemeMode::Light);
    }

    #[test]
    fn toggle_writes_through() {
        let backend = shared(MemoryStore::default());
        let mut store = ThemeStore::load(backend.clone()).unwrap();
        assert_eq!(store.toggle().unwrap(), ThemeMode::Dark);

        let reloaded = ThemeStore::load(backend).unwrap();
        assert_eq!(reloaded.get(), ThemeMode::Dark);
    }
}
