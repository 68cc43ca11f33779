//! Text rendering of the list and detail views.
//!
//! The renderer writes view models to any [`io::Write`] as plain lines,
//! styled with the active [`Palette`] when color is enabled. It does no
//! screen management: callers print a fresh frame after each change.
//!
//! # Example
//!
//! ```
//! use pokedex::storage::ThemeMode;
//! use pokedex::ui::{Palette, Renderer};
//!
//! let renderer = Renderer::new(Palette::for_mode(ThemeMode::Light)?, false);
//! let mut out = Vec::new();
//! renderer.render_message(&mut out, "Theme set to light")?;
//! assert_eq!(String::from_utf8(out).unwrap(), "Theme set to light\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::ui::theme::Palette;
use crate::ui::viewmodel::{DetailViewModel, ListViewModel, LOADING_MESSAGE, STAT_BAR_WIDTH};
use std::io::{self, Write};

/// Writes view models as text.
#[derive(Debug, Clone)]
pub struct Renderer {
    palette: Palette,
    color: bool,
}

impl Renderer {
    #[must_use]
    pub fn new(palette: Palette, color: bool) -> Self {
        Self { palette, color }
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Wraps `text` in a foreground color (and optional background).
    fn paint(&self, text: &str, fg: &str, bg: Option<&str>) -> String {
        if !self.color {
            return text.to_string();
        }
        let bg = bg.map(Palette::bg).unwrap_or_default();
        format!("{}{bg}{text}{}", Palette::fg(fg), Palette::reset())
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("{}{text}{}", Palette::bold(), Palette::reset())
        } else {
            text.to_string()
        }
    }

    fn rule(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint(&"─".repeat(48), &self.palette.colors.border, None))
    }

    /// Renders the list view.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn render_list(&self, out: &mut impl Write, vm: &ListViewModel) -> io::Result<()> {
        let colors = &self.palette.colors;

        let title = self.paint(&vm.header.title, &colors.header_fg, colors.header_bg.as_deref());
        writeln!(out, "{}  {}", self.bold(&title), self.paint(&format!("[{}]", vm.header.theme), &colors.text_dim, None))?;

        let mut filters = Vec::new();
        if !vm.filters.search.is_empty() {
            filters.push(format!("search: {}", vm.filters.search));
        }
        filters.push(format!("type: {}", vm.filters.category));
        filters.push(format!("sort: {}", vm.filters.sort));
        if vm.filters.favorites_only {
            filters.push("favorites only".to_string());
        }
        writeln!(out, "{}", self.paint(&filters.join(" | "), &colors.text_dim, None))?;
        self.rule(out)?;

        if let Some(error) = &vm.error {
            writeln!(out, "{}", self.paint(&error.message, &colors.error_fg, None))?;
            writeln!(out, "{}", self.paint(&error.hint, &colors.text_dim, None))?;
            return Ok(());
        }

        if vm.loading {
            writeln!(out, "{}", self.paint(LOADING_MESSAGE, &colors.text_dim, None))?;
            return Ok(());
        }

        if let Some(empty) = &vm.empty_state {
            writeln!(out, "{}", self.bold(&empty.message))?;
            writeln!(out, "{}", self.paint(&empty.subtitle, &colors.text_dim, None))?;
        }

        for row in &vm.rows {
            let star = if row.favorite {
                format!(" {}", self.paint("★", &colors.favorite_fg, None))
            } else {
                String::new()
            };
            let badges: Vec<String> = row
                .categories
                .iter()
                .map(|c| self.paint(&format!(" {c} "), &colors.badge_fg, Some(&colors.badge_bg)))
                .collect();
            let badges = if badges.is_empty() {
                String::new()
            } else {
                format!("  {}", badges.join(" "))
            };
            writeln!(
                out,
                "{} {}{star}{badges}",
                self.paint(&row.number, &colors.text_dim, None),
                self.paint(&row.name, &colors.text_normal, None),
            )?;
        }

        if let Some(pager) = &vm.pager {
            self.rule(out)?;
            let previous = if pager.has_previous { "< prev" } else { "" };
            let next = if pager.has_next { "next >" } else { "" };
            writeln!(
                out,
                "{previous:<8}{}{next:>8}",
                self.paint(&pager.label(), &colors.accent, None)
            )?;
        }
        Ok(())
    }

    /// Renders the detail view.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn render_detail(&self, out: &mut impl Write, vm: &DetailViewModel) -> io::Result<()> {
        let colors = &self.palette.colors;

        let star = if vm.favorite {
            self.paint("★", &colors.favorite_fg, None)
        } else {
            self.paint("☆", &colors.text_dim, None)
        };
        writeln!(
            out,
            "{} {} {star}",
            self.bold(&self.paint(&vm.name, &colors.header_fg, None)),
            self.paint(&vm.number, &colors.text_dim, None)
        )?;
        if let Some(artwork) = vm.artwork_url.as_ref().or(vm.sprite_url.as_ref()) {
            writeln!(out, "{}", self.paint(artwork, &colors.accent, None))?;
        }
        self.rule(out)?;

        writeln!(out, "Height   {}", vm.height)?;
        writeln!(out, "Weight   {}", vm.weight)?;
        writeln!(out, "Types    {}", vm.types.join(", "))?;
        writeln!(out, "Abilities {}", vm.abilities.join(", "))?;
        self.rule(out)?;

        for stat in &vm.stats {
            let bar = format!(
                "{}{}",
                "█".repeat(stat.filled),
                "░".repeat(STAT_BAR_WIDTH.saturating_sub(stat.filled))
            );
            writeln!(
                out,
                "{:<16}{:>4} {}",
                stat.label,
                stat.value,
                self.paint(&bar, &colors.stat_bar, None)
            )?;
        }
        self.rule(out)?;
        writeln!(out, "{}", self.paint(&format!("Back to List: {}", vm.back_link), &colors.accent, None))
    }

    /// Writes a single status line.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn render_message(&self, out: &mut impl Write, message: &str) -> io::Result<()> {
        writeln!(out, "{}", self.paint(message, &self.palette.colors.text_normal, None))
    }

    /// Writes an error line.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn render_error(&self, out: &mut impl Write, message: &str) -> io::Result<()> {
        writeln!(out, "{}", self.paint(message, &self.palette.colors.error_fg, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::engine::ListOutput;
    use crate::app::view::{ListMode, ListViewState};
    use crate::domain::Entity;
    use crate::storage::{FavoritesSet, ThemeMode};

    fn plain() -> Renderer {
        Renderer::new(Palette::for_mode(ThemeMode::Light).unwrap(), false)
    }

    fn render(output: &ListOutput, favorites: &FavoritesSet) -> String {
        let vm = ListViewModel::build(&ListViewState::default(), output, favorites, "light");
        let mut buf = Vec::new();
        plain().render_list(&mut buf, &vm).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn list_shows_rows_star_and_pager() {
        let output = ListOutput {
            items: vec![
                Entity::from_resource("bulbasaur", "https://pokeapi.co/api/v2/pokemon/1/").unwrap(),
                Entity::from_resource("pikachu", "https://pokeapi.co/api/v2/pokemon/25/").unwrap(),
            ],
            total_pages: 66,
            mode: ListMode::Server,
            loading: false,
            error: None,
        };
        let favorites: FavoritesSet = ["25"].into_iter().collect();

        let text = render(&output, &favorites);

        assert!(text.contains("#001 Bulbasaur\n"));
        assert!(text.contains("#025 Pikachu ★"));
        assert!(text.contains("Page 1 of 66"));
        assert!(text.contains("next >"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn empty_list_shows_hint() {
        let output = ListOutput {
            items: vec![],
            total_pages: 1,
            mode: ListMode::Client,
            loading: false,
            error: None,
        };
        let text = render(&output, &FavoritesSet::default());
        assert!(text.contains("No Pokémon found"));
        assert!(text.contains("Try adjusting your search or filters"));
        assert!(text.contains("type: All Types"));
        assert!(!text.contains("Page 1 of 1"));
    }
}
