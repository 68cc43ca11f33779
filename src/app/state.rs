//! Interactive application state.
//!
//! [`AppState`] bundles the pieces of state the browse loop mutates: the
//! address holding the list view, the two persisted stores, and the last
//! assembled list page. View models are computed on demand from it.

use crate::app::engine::ListOutput;
use crate::app::url_state::{AddressableState, UrlQuery, UrlState};
use crate::app::view::ListViewState;
use crate::storage::{FavoritesStore, ThemeStore};
use crate::ui::ListViewModel;

/// State of one interactive session.
#[derive(Debug)]
pub struct AppState<S = UrlQuery> {
    /// Address the list view state is read from and written to.
    pub url: UrlState<S>,
    pub favorites: FavoritesStore,
    pub theme: ThemeStore,
    /// Last list page assembled for the current view, if any.
    pub list: Option<ListOutput>,
    /// Entity whose detail view last failed to load. `Retry` targets it
    /// until any other event moves on.
    pub failed_detail: Option<u32>,
}

impl<S: AddressableState> AppState<S> {
    #[must_use]
    pub fn new(location: S, favorites: FavoritesStore, theme: ThemeStore) -> Self {
        Self {
            url: UrlState::new(location),
            favorites,
            theme,
            list: None,
            failed_detail: None,
        }
    }

    #[must_use]
    pub fn view(&self) -> ListViewState {
        self.url.view()
    }

    /// Page count of the last assembled list; 1 before anything loaded.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.list.as_ref().map_or(1, |list| list.total_pages.max(1))
    }

    /// Entity id of the `index`-th row (0-based) of the current page.
    #[must_use]
    pub fn row_id(&self, index: usize) -> Option<u32> {
        self.list.as_ref()?.items.get(index).map(|e| e.id)
    }

    /// View model for the current list page, once one has been assembled.
    #[must_use]
    pub fn compute_viewmodel(&self) -> Option<ListViewModel> {
        let list = self.list.as_ref()?;
        Some(ListViewModel::build(
            &self.view(),
            list,
            self.favorites.set(),
            self.theme.get().as_str(),
        ))
    }
}
