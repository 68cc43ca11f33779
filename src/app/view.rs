//! List view state and list mode types.
//!
//! [`ListViewState`] is everything the list view shows, derived entirely from
//! the address query parameters. [`ListMode`] decides, once per evaluation,
//! whether the list is assembled locally from a full index or taken as one
//! remote page.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Entities per list page.
pub const PAGE_SIZE: u32 = 20;

/// Categories offered by the type filter, in selector order.
pub const CATEGORIES: [&str; 18] = [
    "fire", "water", "grass", "electric", "psychic", "ice", "dragon", "dark", "fairy", "normal", "fighting",
    "flying", "poison", "ground", "rock", "bug", "ghost", "steel",
];

/// Label of the "no category" choice.
pub const ALL_CATEGORIES_LABEL: &str = "All Types";

/// Normalizes a category typed by the user.
///
/// Empty input (and `all`) clears the filter and yields `""`.
///
/// # Errors
///
/// Returns a message listing the valid categories when `raw` is not one of
/// [`CATEGORIES`].
///
/// # Examples
///
/// ```
/// use pokedex::app::view::parse_category;
///
/// assert_eq!(parse_category(" Fire ").as_deref(), Ok("fire"));
/// assert_eq!(parse_category("").as_deref(), Ok(""));
/// assert!(parse_category("fier").is_err());
/// ```
pub fn parse_category(raw: &str) -> Result<String, String> {
    let category = raw.trim().to_lowercase();
    if category.is_empty() || category == "all" {
        return Ok(String::new());
    }
    if CATEGORIES.contains(&category.as_str()) {
        Ok(category)
    } else {
        Err(format!("unknown type \"{}\" (expected one of: {})", raw.trim(), CATEGORIES.join(", ")))
    }
}

/// Sort order of the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SortKey {
    #[default]
    IdAsc,
    IdDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub const ALL: [Self; 4] = [Self::IdAsc, Self::IdDesc, Self::NameAsc, Self::NameDesc];

    /// Query-parameter spelling, e.g. `name-desc`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IdAsc => "id-asc",
            Self::IdDesc => "id-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    /// Label shown in the sort selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::IdAsc => "Number (Low to High)",
            Self::IdDesc => "Number (High to Low)",
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
        }
    }

    /// Name sorts need the whole corpus, so they force client-side mode.
    #[must_use]
    pub const fn is_name_sort(self) -> bool {
        matches!(self, Self::NameAsc | Self::NameDesc)
    }

    /// Parses a query-parameter value, falling back to [`SortKey::IdAsc`].
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                format!("unknown sort \"{s}\" (expected id-asc, id-desc, name-asc or name-desc)")
            })
    }
}

/// Locale-style name ordering: case-insensitive first, then lowercase
/// before uppercase (`"mew" < "Mew"`).
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Everything the list view displays, as read from the address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewState {
    /// 1-based page number, never 0.
    pub page: u32,
    pub search_text: String,
    /// Category filter; empty means none.
    pub category: String,
    pub sort: SortKey,
    pub favorites_only: bool,
}

impl Default for ListViewState {
    fn default() -> Self {
        Self {
            page: 1,
            search_text: String::new(),
            category: String::new(),
            sort: SortKey::IdAsc,
            favorites_only: false,
        }
    }
}

impl ListViewState {
    /// Offset of the first entity on the current page.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.page.max(1).saturating_sub(1).saturating_mul(PAGE_SIZE)
    }

    #[must_use]
    pub fn mode(&self) -> ListMode {
        ListMode::select(self)
    }
}

/// Where list items come from for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Filter, sort and paginate a locally held index.
    Client,
    /// Show one page of the remote paginated index as-is.
    Server,
}

impl ListMode {
    /// Client mode whenever any filter or a name sort is active.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokedex::app::view::{ListMode, ListViewState, SortKey};
    ///
    /// let mut view = ListViewState::default();
    /// assert_eq!(ListMode::select(&view), ListMode::Server);
    ///
    /// view.sort = SortKey::IdDesc;
    /// assert_eq!(ListMode::select(&view), ListMode::Server);
    ///
    /// view.sort = SortKey::NameAsc;
    /// assert_eq!(ListMode::select(&view), ListMode::Client);
    /// ```
    #[must_use]
    pub fn select(view: &ListViewState) -> Self {
        let client = !view.search_text.is_empty()
            || view.favorites_only
            || view.sort.is_name_sort()
            || !view.category.is_empty();
        if client {
            Self::Client
        } else {
            Self::Server
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_round_trip_and_fall_back() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse_or_default(key.as_str()), key);
        }
        assert_eq!(SortKey::parse_or_default("weight-asc"), SortKey::IdAsc);
    }

    #[test]
    fn names_compare_case_insensitively_with_stable_tie_break() {
        assert_eq!(compare_names("abra", "Bulbasaur"), Ordering::Less);
        assert_eq!(compare_names("mew", "Mew"), Ordering::Less);
        assert_eq!(compare_names("Mew", "mew"), Ordering::Greater);
        assert_eq!(compare_names("mew", "mew"), Ordering::Equal);
    }

    #[test]
    fn categories_are_validated_against_the_catalog() {
        assert_eq!(CATEGORIES.len(), 18);
        assert_eq!(parse_category("STEEL"), Ok("steel".to_string()));
        assert_eq!(parse_category("All"), Ok(String::new()));
        let err = parse_category("plasma").unwrap_err();
        assert!(err.contains("plasma"));
        assert!(err.contains("fairy"));
    }

    #[test]
    fn any_filter_selects_client_mode() {
        let base = ListViewState::default();
        for view in [
            ListViewState { search_text: "pi".into(), ..base.clone() },
            ListViewState { category: "fire".into(), ..base.clone() },
            ListViewState { favorites_only: true, ..base.clone() },
            ListViewState { sort: SortKey::NameDesc, ..base.clone() },
        ] {
            assert_eq!(view.mode(), ListMode::Client);
        }
        assert_eq!(ListViewState { page: 3, ..base }.offset(), 40);
    }
}
