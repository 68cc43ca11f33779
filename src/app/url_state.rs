//! Address-bar state for the list view.
//!
//! The query parameters `page`, `q`, `type`, `sort` and `favorites` are the
//! single source of truth for [`ListViewState`]. [`UrlState`] reads them
//! through an injected [`AddressableState`] and writes changes back in
//! canonical form: a parameter equal to its default is removed, anything
//! else is set, and parameters it does not know about are left alone.
//!
//! When there is no address to write to, [`Detached`] stands in: reads come
//! back empty and writes are dropped with a warning.

use crate::app::view::{ListViewState, SortKey};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

pub const PARAM_PAGE: &str = "page";
pub const PARAM_SEARCH: &str = "q";
pub const PARAM_CATEGORY: &str = "type";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_FAVORITES: &str = "favorites";

/// Parameter carrying the entity id on detail routes.
const PARAM_ID: &str = "id";

/// Characters escaped in query keys and values (form-urlencoded style, with
/// the space written as `+`).
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*')
    .remove(b' ');

/// Ordered query-string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses a query string, with or without its leading `?`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokedex::app::url_state::QueryParams;
    ///
    /// let params = QueryParams::parse("?q=mr+mime&type=psychic&page=2");
    /// assert_eq!(params.get("q"), Some("mr mime"));
    /// assert_eq!(params.to_string(), "q=mr+mime&type=psychic&page=2");
    /// ```
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let pairs = query
            .trim_start_matches('?')
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self { pairs }
    }

    /// First value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `key`, replacing the first occurrence in place and dropping any
    /// repeats; appends if absent.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = false;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Removes every occurrence of `key`.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Sets `key` to `value`, or removes it when `value` is the default.
    pub fn set_or_remove(&mut self, key: &str, value: &str, default: &str) {
        if value == default {
            self.remove(key);
        } else {
            self.set(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `?`-prefixed query string, or empty when there are no parameters.
    #[must_use]
    pub fn to_query_suffix(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("?{self}")
        }
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", encode(key), encode(value))?;
        }
        Ok(())
    }
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_COMPONENT)
        .to_string()
        .replace(' ', "+")
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Somewhere the current query parameters live.
pub trait AddressableState {
    /// Current parameters.
    fn read(&self) -> QueryParams;

    /// Replaces the parameters. Returns `false` if the write was dropped.
    fn write(&mut self, params: QueryParams) -> bool;

    /// Whether writes take effect.
    fn is_addressable(&self) -> bool {
        true
    }
}

/// In-memory address holding a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlQuery {
    params: QueryParams,
}

impl UrlQuery {
    #[must_use]
    pub fn new(query: &str) -> Self {
        Self {
            params: QueryParams::parse(query),
        }
    }
}

impl AddressableState for UrlQuery {
    fn read(&self) -> QueryParams {
        self.params.clone()
    }

    fn write(&mut self, params: QueryParams) -> bool {
        tracing::trace!(query = %params, "address updated");
        self.params = params;
        true
    }
}

/// Address used outside any routing context. Reads are empty; writes are
/// dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl AddressableState for Detached {
    fn read(&self) -> QueryParams {
        QueryParams::default()
    }

    fn write(&mut self, params: QueryParams) -> bool {
        tracing::warn!(query = %params, "view state update dropped: no addressable state");
        false
    }

    fn is_addressable(&self) -> bool {
        false
    }
}

/// Typed access to the list view parameters of an address.
#[derive(Debug, Clone, Default)]
pub struct UrlState<S> {
    location: S,
}

impl<S: AddressableState> UrlState<S> {
    pub fn new(location: S) -> Self {
        Self { location }
    }

    #[must_use]
    pub fn location(&self) -> &S {
        &self.location
    }

    /// Raw parameters, including ones this adapter does not interpret.
    #[must_use]
    pub fn params(&self) -> QueryParams {
        self.location.read()
    }

    /// Current list view state. Invalid values read as their defaults.
    #[must_use]
    pub fn view(&self) -> ListViewState {
        view_from_params(&self.location.read())
    }

    /// Sets the search text and returns to page 1.
    pub fn set_search(&mut self, text: &str) -> bool {
        self.update(|params| {
            params.set_or_remove(PARAM_SEARCH, text, "");
            params.remove(PARAM_PAGE);
        })
    }

    /// Sets the category filter (empty clears it) and returns to page 1.
    pub fn set_category(&mut self, category: &str) -> bool {
        self.update(|params| {
            params.set_or_remove(PARAM_CATEGORY, category, "");
            params.remove(PARAM_PAGE);
        })
    }

    /// Sets the sort order. The page is kept.
    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        self.update(|params| {
            params.set_or_remove(PARAM_SORT, sort.as_str(), SortKey::default().as_str());
        })
    }

    /// Toggles the favorites-only filter and returns to page 1.
    pub fn set_favorites_only(&mut self, favorites_only: bool) -> bool {
        self.update(|params| {
            if favorites_only {
                params.set(PARAM_FAVORITES, "true");
            } else {
                params.remove(PARAM_FAVORITES);
            }
            params.remove(PARAM_PAGE);
        })
    }

    /// Moves to `page`; values below 1 are written as page 1.
    pub fn set_page(&mut self, page: u32) -> bool {
        self.update(|params| {
            params.set_or_remove(PARAM_PAGE, &page.max(1).to_string(), "1");
        })
    }

    /// Link to the detail route for `id`, carrying the current list state.
    #[must_use]
    pub fn detail_link(&self, id: u32) -> String {
        detail_link(&self.view(), id)
    }

    fn update(&mut self, change: impl FnOnce(&mut QueryParams)) -> bool {
        let mut params = self.location.read();
        change(&mut params);
        self.location.write(params)
    }
}

/// Link to the detail route for `id` that carries `view` for the way back.
///
/// # Examples
///
/// ```
/// use pokedex::app::url_state::detail_link;
/// use pokedex::app::{ListViewState, SortKey};
///
/// let view = ListViewState { sort: SortKey::NameDesc, ..ListViewState::default() };
/// assert_eq!(detail_link(&view, 6), "/pokemon/6?sort=name-desc");
/// assert_eq!(detail_link(&ListViewState::default(), 6), "/pokemon/6");
/// ```
#[must_use]
pub fn detail_link(view: &ListViewState, id: u32) -> String {
    format!("/pokemon/{id}{}", canonical_params(view).to_query_suffix())
}

/// Parses list view state from raw parameters.
#[must_use]
pub fn view_from_params(params: &QueryParams) -> ListViewState {
    let page = params
        .get(PARAM_PAGE)
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1);

    ListViewState {
        page,
        search_text: params.get(PARAM_SEARCH).unwrap_or_default().to_string(),
        category: params.get(PARAM_CATEGORY).unwrap_or_default().to_string(),
        sort: params
            .get(PARAM_SORT)
            .map(SortKey::parse_or_default)
            .unwrap_or_default(),
        favorites_only: params.get(PARAM_FAVORITES) == Some("true"),
    }
}

/// The minimal parameter set describing `view`.
#[must_use]
pub fn canonical_params(view: &ListViewState) -> QueryParams {
    let mut params = QueryParams::default();
    params.set_or_remove(PARAM_PAGE, &view.page.max(1).to_string(), "1");
    params.set_or_remove(PARAM_SEARCH, &view.search_text, "");
    params.set_or_remove(PARAM_CATEGORY, &view.category, "");
    params.set_or_remove(PARAM_SORT, view.sort.as_str(), SortKey::default().as_str());
    if view.favorites_only {
        params.set(PARAM_FAVORITES, "true");
    }
    params
}

/// Link back to the list from a detail route, dropping the `id` parameter.
#[must_use]
pub fn back_link(params: &QueryParams) -> String {
    let mut params = params.clone();
    params.remove(PARAM_ID);
    format!("/{}", params.to_query_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_values_read_as_defaults() {
        let state = UrlState::new(UrlQuery::new("page=0&sort=weight&favorites=yes"));
        assert_eq!(state.view(), ListViewState::default());

        let state = UrlState::new(UrlQuery::new("page=abc"));
        assert_eq!(state.view().page, 1);
    }

    #[test]
    fn filter_changes_reset_page_and_keep_unknown_params() {
        let mut state = UrlState::new(UrlQuery::new("page=4&utm=x&sort=name-asc"));

        assert!(state.set_search("bulba"));
        assert_eq!(state.params().to_string(), "utm=x&sort=name-asc&q=bulba");

        state.set_page(3);
        state.set_category("grass");
        let view = state.view();
        assert_eq!(view.page, 1);
        assert_eq!(view.category, "grass");
        assert_eq!(state.params().get("utm"), Some("x"));

        state.set_page(2);
        state.set_favorites_only(true);
        assert_eq!(state.view().page, 1);
        assert!(state.view().favorites_only);
    }

    #[test]
    fn defaults_are_removed_from_the_address() {
        let mut state = UrlState::new(UrlQuery::new("q=pika&sort=id-desc&page=2"));
        state.set_sort(SortKey::IdAsc);
        assert_eq!(state.params().get(PARAM_SORT), None);
        assert_eq!(state.view().page, 2);

        state.set_search("");
        state.set_favorites_only(false);
        assert!(state.params().is_empty());
    }

    #[test]
    fn detached_reads_empty_and_drops_writes() {
        let mut state = UrlState::new(Detached);
        assert!(!state.set_search("mew"));
        assert!(!state.location().is_addressable());
        assert_eq!(state.view(), ListViewState::default());
    }

    #[test]
    fn links_carry_list_state() {
        let state = UrlState::new(UrlQuery::new("sort=name-asc&q=mr+mime"));
        assert_eq!(state.detail_link(122), "/pokemon/122?q=mr+mime&sort=name-asc");

        let params = QueryParams::parse("id=122&q=mr+mime");
        assert_eq!(back_link(&params), "/?q=mr+mime");
        assert_eq!(back_link(&QueryParams::parse("id=1")), "/");
    }
}
