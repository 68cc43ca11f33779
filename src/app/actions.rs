//! Follow-up work requested by the event handler.
//!
//! The handler only mutates local state (address, favorites, theme). Anything
//! that needs the network is returned as an [`Action`] for the caller's
//! async loop to run.

/// Side effects to run after an event has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Re-run the list queries for the current view and re-assemble.
    ReloadList,
    /// Drop cached list data for the current view, then reload.
    Retry,
    /// Load and show the detail view for an entity id.
    ShowDetail(u32),
    /// Drop any cached record for a detail that failed to load, then load
    /// and show it again.
    RetryDetail(u32),
    /// Leave the interactive loop.
    Quit,
}
