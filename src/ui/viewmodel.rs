//! View model types representing renderable UI state.
//!
//! View models are computed from the list output or a detail record and hold
//! display-ready strings only. The renderer turns them into text; nothing in
//! here decides what the list contains.

use crate::app::engine::ListOutput;
use crate::app::url_state::detail_link;
use crate::app::view::{ListViewState, ALL_CATEGORIES_LABEL};
use crate::domain::EntityDetails;
use crate::storage::FavoritesSet;

/// Widest stat value the bars are scaled to.
pub const MAX_STAT: u32 = 255;

/// Width of a full stat bar in cells.
pub const STAT_BAR_WIDTH: usize = 20;

pub const EMPTY_MESSAGE: &str = "No Pokémon found";
pub const EMPTY_SUBTITLE: &str = "Try adjusting your search or filters";
pub const RETRY_HINT: &str = "Press r to retry";
pub const LOADING_MESSAGE: &str = "Loading Pokémon...";

/// Complete list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewModel {
    pub header: HeaderInfo,
    pub filters: FilterSummary,
    pub rows: Vec<ListRow>,
    /// Omitted on error, and for an empty single-page list.
    pub pager: Option<PagerInfo>,
    pub empty_state: Option<EmptyState>,
    pub error: Option<ErrorInfo>,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
    /// Name of the active theme, shown next to the title.
    pub theme: String,
}

/// Active filters as the user set them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSummary {
    pub search: String,
    /// Selected category, or "All Types".
    pub category: String,
    pub sort: String,
    pub favorites_only: bool,
}

/// One entity row, e.g. `#025 Pikachu ★`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub number: String,
    pub name: String,
    pub categories: Vec<String>,
    pub favorite: bool,
    pub detail_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerInfo {
    pub page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PagerInfo {
    #[must_use]
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub hint: String,
}

impl ListViewModel {
    /// Builds the list view for `view` from an assembled page.
    #[must_use]
    pub fn build(view: &ListViewState, output: &ListOutput, favorites: &FavoritesSet, theme: &str) -> Self {
        let rows: Vec<ListRow> = output
            .items
            .iter()
            .map(|entity| ListRow {
                number: entity.number(),
                name: capitalize(&entity.name),
                categories: entity.categories.clone(),
                favorite: favorites.contains_id(entity.id),
                detail_link: detail_link(view, entity.id),
            })
            .collect();

        let error = output.error.as_ref().map(|e| ErrorInfo {
            message: e.message.clone(),
            hint: RETRY_HINT.to_string(),
        });

        let empty_state = output.is_empty().then(|| EmptyState {
            message: EMPTY_MESSAGE.to_string(),
            subtitle: EMPTY_SUBTITLE.to_string(),
        });

        let pager = (error.is_none() && (!rows.is_empty() || output.total_pages > 1)).then(|| PagerInfo {
            page: view.page,
            total_pages: output.total_pages,
            has_previous: view.page > 1,
            has_next: view.page < output.total_pages,
        });

        Self {
            header: HeaderInfo {
                title: "Pokédex".to_string(),
                theme: theme.to_string(),
            },
            filters: FilterSummary {
                search: view.search_text.clone(),
                category: if view.category.is_empty() {
                    ALL_CATEGORIES_LABEL.to_string()
                } else {
                    view.category.clone()
                },
                sort: view.sort.label().to_string(),
                favorites_only: view.favorites_only,
            },
            rows,
            pager,
            empty_state,
            error,
            loading: output.loading && output.items.is_empty() && output.error.is_none(),
        }
    }
}

/// Complete detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailViewModel {
    pub number: String,
    pub name: String,
    pub favorite: bool,
    pub artwork_url: Option<String>,
    pub sprite_url: Option<String>,
    /// e.g. `0.4 m`
    pub height: String,
    /// e.g. `6.0 kg`
    pub weight: String,
    pub types: Vec<String>,
    /// e.g. `Lightning Rod (hidden)`
    pub abilities: Vec<String>,
    pub stats: Vec<StatRow>,
    pub back_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub label: String,
    pub value: u32,
    /// Filled cells out of [`STAT_BAR_WIDTH`].
    pub filled: usize,
}

impl DetailViewModel {
    #[must_use]
    pub fn build(details: &EntityDetails, favorite: bool, back_link: impl Into<String>) -> Self {
        let mut abilities: Vec<_> = details.abilities.iter().collect();
        abilities.sort_by_key(|a| a.slot);

        Self {
            number: format!("#{:03}", details.id),
            name: capitalize(&details.name),
            favorite,
            artwork_url: details.artwork_url.clone(),
            sprite_url: details.sprite_url.clone(),
            height: tenths(details.height, "m"),
            weight: tenths(details.weight, "kg"),
            types: details.categories.iter().map(|c| capitalize(c)).collect(),
            abilities: abilities
                .into_iter()
                .map(|a| {
                    let name = title_case(&a.name);
                    if a.hidden {
                        format!("{name} (hidden)")
                    } else {
                        name
                    }
                })
                .collect(),
            stats: details
                .stats
                .iter()
                .map(|s| StatRow {
                    label: title_case(&s.name),
                    value: s.base,
                    filled: stat_cells(s.base),
                })
                .collect(),
            back_link: back_link.into(),
        }
    }
}

/// Formats a value given in tenths of `unit` with one decimal.
fn tenths(value: u32, unit: &str) -> String {
    format!("{}.{} {unit}", value / 10, value % 10)
}

fn stat_cells(value: u32) -> usize {
    let value = value.min(MAX_STAT) as usize;
    (value * STAT_BAR_WIDTH + MAX_STAT as usize / 2) / MAX_STAT as usize
}

/// Uppercases the first character.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `special-attack` becomes `Special Attack`.
#[must_use]
pub fn title_case(s: &str) -> String {
    s.split('-').map(capitalize).collect::<Vec<_>>().join(" ")
}
