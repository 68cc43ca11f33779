//! Platform paths for configuration and local data.
//!
//! Follows the XDG base directory layout: `$XDG_DATA_HOME/pokedex` (default
//! `~/.local/share/pokedex`) for the key-value store and log, and
//! `$XDG_CONFIG_HOME/pokedex` (default `~/.config/pokedex`) for the config
//! file.

use std::env;
use std::path::PathBuf;

/// Directory name used under the data and config roots.
pub const APP_DIR: &str = "pokedex";

/// Config file name inside [`get_config_dir`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    if let Some(dir) = env::var_os(var).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join(APP_DIR);
    }
    let mut path = home_dir().unwrap_or_else(|| PathBuf::from("."));
    for segment in fallback {
        path.push(segment);
    }
    path.join(APP_DIR)
}

/// Returns the data directory, e.g. `~/.local/share/pokedex`.
///
/// Falls back to `./.local/share/pokedex` when no home directory is known.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

/// Returns the config directory, e.g. `~/.config/pokedex`.
#[must_use]
pub fn get_config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

/// Default location of the config file.
#[must_use]
pub fn default_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE_NAME)
}

/// Expands a leading `~` to the home directory.
///
/// Paths without a leading `~`, and all paths when no home directory is
/// known, are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let Some(home) = home_dir() else {
        return PathBuf::from(path);
    };
    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
