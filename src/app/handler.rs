//! Event handling and state transition logic.
//!
//! The browse loop turns user input into [`Event`]s; [`handle_event`]
//! applies them to [`AppState`] and returns whether the screen needs a
//! redraw plus the [`Action`]s that need the network.
//!
//! # Event Types
//!
//! - **Filters**: `Search`, `SelectCategory`, `SelectSort`, `SetFavoritesOnly`
//! - **Paging**: `PreviousPage`, `NextPage`, `GotoPage`
//! - **Stores**: `ToggleFavorite`, `ToggleTheme`
//! - **Navigation**: `OpenDetail`, `Retry`, `Quit`
//! - **Results**: `ListLoaded` with a freshly assembled page, `DetailFailed`
//!   when a detail view could not be loaded

use crate::app::engine::ListOutput;
use crate::app::url_state::AddressableState;
use crate::app::view::SortKey;
use crate::app::{Action, AppState};
use crate::domain::error::Result;

/// User intents and async results the browse loop feeds in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Settled (debounced) search text.
    Search(String),
    /// Category filter; empty clears it.
    SelectCategory(String),
    SelectSort(SortKey),
    SetFavoritesOnly(bool),
    PreviousPage,
    NextPage,
    /// Jump to a page; clamped to `[1, total_pages]`.
    GotoPage(u32),
    /// Star or un-star an entity.
    ToggleFavorite(u32),
    ToggleTheme,
    OpenDetail(u32),
    Retry,
    Quit,
    /// A list page finished assembling.
    ListLoaded(ListOutput),
    /// The detail view for an entity failed to load.
    DetailFailed(u32),
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// # Returns
///
/// `(redraw, actions)`: whether the visible state changed, and the follow-up
/// work to run. Writes the address refuses (see
/// [`Detached`](crate::app::url_state::Detached)) change nothing and request
/// nothing.
///
/// # Errors
///
/// Returns an error if a favorites or theme change cannot be persisted.
pub fn handle_event<S: AddressableState>(state: &mut AppState<S>, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    if !matches!(event, Event::Retry | Event::DetailFailed(_)) {
        state.failed_detail = None;
    }

    match event {
        Event::Search(text) => {
            if state.view().search_text == *text {
                return Ok((false, vec![]));
            }
            Ok(reload_if(state.url.set_search(text)))
        }
        Event::SelectCategory(category) => {
            let category = category.trim().to_lowercase();
            if state.view().category == category {
                return Ok((false, vec![]));
            }
            Ok(reload_if(state.url.set_category(&category)))
        }
        Event::SelectSort(sort) => {
            if state.view().sort == *sort {
                return Ok((false, vec![]));
            }
            Ok(reload_if(state.url.set_sort(*sort)))
        }
        Event::SetFavoritesOnly(on) => {
            if state.view().favorites_only == *on {
                return Ok((false, vec![]));
            }
            Ok(reload_if(state.url.set_favorites_only(*on)))
        }
        Event::PreviousPage => {
            let page = state.view().page;
            go_to_page(state, page.saturating_sub(1))
        }
        Event::NextPage => {
            let page = state.view().page;
            go_to_page(state, page.saturating_add(1))
        }
        Event::GotoPage(page) => go_to_page(state, *page),
        Event::ToggleFavorite(id) => {
            let starred = state.favorites.toggle(&id.to_string())?;
            tracing::debug!(id, starred, "favorite toggled from browse");
            // The favorites-only list changes membership, others only the star.
            let actions = if state.view().favorites_only {
                vec![Action::ReloadList]
            } else {
                vec![]
            };
            Ok((true, actions))
        }
        Event::ToggleTheme => {
            state.theme.toggle()?;
            Ok((true, vec![]))
        }
        Event::OpenDetail(id) => Ok((false, vec![Action::ShowDetail(*id)])),
        Event::Retry => match state.failed_detail.take() {
            Some(id) => Ok((false, vec![Action::RetryDetail(id)])),
            None => Ok((true, vec![Action::Retry])),
        },
        Event::Quit => Ok((false, vec![Action::Quit])),
        Event::ListLoaded(output) => {
            tracing::debug!(
                items = output.items.len(),
                total_pages = output.total_pages,
                failed = output.error.is_some(),
                "list loaded"
            );
            state.list = Some(output.clone());
            Ok((true, vec![]))
        }
        Event::DetailFailed(id) => {
            tracing::debug!(id, "detail failed, retry will target it");
            state.failed_detail = Some(*id);
            Ok((false, vec![]))
        }
    }
}

fn reload_if(written: bool) -> (bool, Vec<Action>) {
    if written {
        (true, vec![Action::ReloadList])
    } else {
        (false, vec![])
    }
}

fn go_to_page<S: AddressableState>(state: &mut AppState<S>, requested: u32) -> Result<(bool, Vec<Action>)> {
    let target = requested.clamp(1, state.total_pages());
    if target == state.view().page {
        tracing::trace!(requested, target, "page unchanged");
        return Ok((false, vec![]));
    }
    Ok(reload_if(state.url.set_page(target)))
}
