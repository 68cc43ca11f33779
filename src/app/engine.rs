//! List assembly.
//!
//! [`assemble`] turns the current [`ListViewState`], the three list queries
//! and the favorites set into the items of one page. It is a pure function:
//! no I/O, no clock, no logging beyond a trace event, so every property of
//! the list view can be tested against hand-built query states.
//!
//! In client mode the engine filters, sorts and paginates a locally held
//! index (the category index when a category is selected, otherwise the
//! bounded name index). In server mode it shows the remote page as-is,
//! reversed for a descending id sort.

use crate::app::view::{compare_names, ListMode, ListViewState, SortKey, PAGE_SIZE};
use crate::domain::{Entity, Page, RemoteError};
use crate::query::QueryState;
use crate::storage::FavoritesSet;

/// The three list queries, borrowed from wherever they are held.
#[derive(Debug, Clone, Copy)]
pub struct ListSources<'a> {
    pub name_index: &'a QueryState<Vec<Entity>>,
    pub category_index: &'a QueryState<Vec<Entity>>,
    pub page_index: &'a QueryState<Page<Entity>>,
}

/// One evaluated list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOutput {
    pub items: Vec<Entity>,
    /// Always at least 1.
    pub total_pages: u32,
    pub mode: ListMode,
    pub loading: bool,
    pub error: Option<RemoteError>,
}

impl ListOutput {
    /// Whether nothing is loading, nothing failed and the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.loading && self.error.is_none() && self.items.is_empty()
    }
}

/// Number of pages needed for `count` entities, never less than 1.
///
/// # Examples
///
/// ```
/// use pokedex::app::engine::page_count;
///
/// assert_eq!(page_count(0), 1);
/// assert_eq!(page_count(20), 1);
/// assert_eq!(page_count(21), 2);
/// assert_eq!(page_count(1302), 66);
/// ```
#[must_use]
pub fn page_count(count: usize) -> u32 {
    let pages = count.div_ceil(PAGE_SIZE as usize).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Assembles the list page for `view`.
#[must_use]
pub fn assemble(view: &ListViewState, sources: ListSources<'_>, favorites: &FavoritesSet) -> ListOutput {
    let mode = ListMode::select(view);
    let output = match mode {
        ListMode::Client => assemble_client(view, sources, favorites),
        ListMode::Server => assemble_server(view, sources.page_index),
    };
    tracing::trace!(
        ?mode,
        items = output.items.len(),
        total_pages = output.total_pages,
        loading = output.loading,
        failed = output.error.is_some(),
        "list assembled"
    );
    output
}

fn assemble_client(view: &ListViewState, sources: ListSources<'_>, favorites: &FavoritesSet) -> ListOutput {
    let base = if view.category.is_empty() {
        sources.name_index
    } else {
        sources.category_index
    };

    if let Some(error) = &base.error {
        return failed(ListMode::Client, base.loading, error.clone());
    }

    let filtered = filter_and_sort(base.data().map_or(&[][..], Vec::as_slice), view, favorites);
    let total_pages = page_count(filtered.len());
    let items = filtered
        .into_iter()
        .skip(view.offset() as usize)
        .take(PAGE_SIZE as usize)
        .cloned()
        .collect();

    ListOutput {
        items,
        total_pages,
        mode: ListMode::Client,
        loading: base.loading,
        error: None,
    }
}

/// Filters `base` by search text and favorites, then sorts it stably.
///
/// The result is the full filtered set, before pagination.
#[must_use]
pub fn filter_and_sort<'a>(base: &'a [Entity], view: &ListViewState, favorites: &FavoritesSet) -> Vec<&'a Entity> {
    let needle = view.search_text.to_lowercase();
    let mut filtered: Vec<&Entity> = base
        .iter()
        .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
        .filter(|e| !view.favorites_only || favorites.contains_id(e.id))
        .collect();

    match view.sort {
        SortKey::IdAsc => filtered.sort_by_key(|e| e.id),
        SortKey::IdDesc => filtered.sort_by(|a, b| b.id.cmp(&a.id)),
        SortKey::NameAsc => filtered.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::NameDesc => filtered.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }
    filtered
}

fn assemble_server(view: &ListViewState, page_index: &QueryState<Page<Entity>>) -> ListOutput {
    if let Some(error) = &page_index.error {
        return failed(ListMode::Server, page_index.loading, error.clone());
    }

    let (mut items, total_pages) = match page_index.data() {
        Some(page) => (page.results.clone(), page_count(page.count as usize)),
        None => (Vec::new(), 1),
    };
    if view.sort == SortKey::IdDesc {
        items.reverse();
    }

    ListOutput {
        items,
        total_pages,
        mode: ListMode::Server,
        loading: page_index.loading,
        error: None,
    }
}

fn failed(mode: ListMode, loading: bool, error: RemoteError) -> ListOutput {
    ListOutput {
        items: Vec::new(),
        total_pages: 1,
        mode,
        loading,
        error: Some(error),
    }
}
