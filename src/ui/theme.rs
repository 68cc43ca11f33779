//! Color palettes and ANSI escape sequence generation.
//!
//! One palette per [`ThemeMode`], bundled into the binary as TOML. A custom
//! palette can be loaded from a file with the same layout.
//!
//! # TOML Format
//!
//! ```toml
//! name = "dark"
//!
//! [colors]
//! header_fg = "#89b4fa"
//! header_bg = "#181825"   # optional
//! text_normal = "#cdd6f4"
//! text_dim = "#6c7086"
//! border = "#45475a"
//! accent = "#89b4fa"
//! favorite_fg = "#f9e2af"
//! error_fg = "#f38ba8"
//! stat_bar = "#74c7ec"
//! badge_fg = "#1e1e2e"
//! badge_bg = "#b4befe"
//! ```

use crate::domain::error::{DexError, Result};
use crate::storage::ThemeMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

const LIGHT_TOML: &str = include_str!("../../themes/light.toml");
const DARK_TOML: &str = include_str!("../../themes/dark.toml");

/// Colors for one theme.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Palette {
    pub name: String,
    pub colors: PaletteColors,
}

/// Hex color strings (e.g. `"#cdd6f4"`) for every styled element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaletteColors {
    pub header_fg: String,
    #[serde(default)]
    pub header_bg: Option<String>,
    pub text_normal: String,
    pub text_dim: String,
    pub border: String,
    /// Links and the current page marker.
    pub accent: String,
    /// Favorite star.
    pub favorite_fg: String,
    pub error_fg: String,
    pub stat_bar: String,
    /// Category badges.
    pub badge_fg: String,
    pub badge_bg: String,
}

impl Palette {
    /// The bundled palette for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Theme`] if the bundled TOML does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokedex::storage::ThemeMode;
    /// use pokedex::ui::Palette;
    ///
    /// let palette = Palette::for_mode(ThemeMode::Dark)?;
    /// assert_eq!(palette.name, "dark");
    /// # Ok::<(), pokedex::domain::DexError>(())
    /// ```
    pub fn for_mode(mode: ThemeMode) -> Result<Self> {
        let source = match mode {
            ThemeMode::Light => LIGHT_TOML,
            ThemeMode::Dark => DARK_TOML,
        };
        toml::from_str(source)
            .map_err(|e| DexError::Theme(format!("bundled {mode} palette is invalid: {e}")))
    }

    /// Loads a palette from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| DexError::Theme(format!("failed to parse palette TOML: {e}")))
    }

    /// Returns `(r, g, b)`, or white if `hex` is not a 6-digit color.
    fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return (255, 255, 255);
        }

        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
        (r, g, b)
    }

    /// 24-bit foreground escape sequence for `hex`.
    #[must_use]
    pub fn fg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[38;2;{r};{g};{b}m")
    }

    /// 24-bit background escape sequence for `hex`.
    #[must_use]
    pub fn bg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[48;2;{r};{g};{b}m")
    }

    #[must_use]
    pub const fn bold() -> &'static str {
        "\u{001b}[1m"
    }

    #[must_use]
    pub const fn dim() -> &'static str {
        "\u{001b}[2m"
    }

    #[must_use]
    pub const fn reset() -> &'static str {
        "\u{001b}[0m"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_palettes_parse() {
        assert_eq!(Palette::for_mode(ThemeMode::Light).unwrap().colors.header_bg, None);
        assert!(Palette::for_mode(ThemeMode::Dark).unwrap().colors.header_bg.is_some());
    }

    #[test]
    fn bad_hex_falls_back_to_white() {
        assert_eq!(Palette::fg("#12"), "\u{1b}[38;2;255;255;255m");
        assert_eq!(Palette::bg("#1e1e2e"), "\u{1b}[48;2;30;30;46m");
    }
}
