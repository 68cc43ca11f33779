//! Latest-key-wins holder for one logical query.
//!
//! When the user types "char" and then "chari", the request for "char" may
//! still finish after the one for "chari". A [`QuerySlot`] hands out a
//! [`Ticket`] per request and only accepts results for the key it tracks
//! now. Requests for the same key share one fetch, so any of their results
//! is current.

use super::key::QueryKey;
use super::state::QueryState;
use crate::domain::RemoteError;

/// Proof that a request was started for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: QueryKey,
}

impl Ticket {
    /// Key the request was started for.
    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// State of one logical query (e.g. "the category index") across key changes.
#[derive(Debug)]
pub struct QuerySlot<T> {
    key: Option<QueryKey>,
    state: QueryState<T>,
}

impl<T> Default for QuerySlot<T> {
    fn default() -> Self {
        Self {
            key: None,
            state: QueryState::idle(),
        }
    }
}

impl<T: Clone> QuerySlot<T> {
    /// Marks the slot loading for `key` and returns the ticket the result
    /// must be presented with.
    ///
    /// Data resolved for the same key is kept while reloading; data for a
    /// different key is cleared.
    pub fn begin(&mut self, key: QueryKey) -> Ticket {
        if self.key.as_ref() != Some(&key) {
            self.state.data = None;
        }
        self.state.loading = true;
        self.state.error = None;
        self.key = Some(key.clone());

        Ticket { key }
    }

    /// Applies the result of the request identified by `ticket`.
    ///
    /// Returns `false` and leaves the slot untouched when the slot has moved
    /// to another key (or was cleared) since.
    pub fn complete(&mut self, ticket: &Ticket, result: Result<T, RemoteError>) -> bool {
        if self.key.as_ref() != Some(&ticket.key) {
            tracing::debug!(key = %ticket.key, "dropping stale query result");
            return false;
        }
        self.state = QueryState::from_result(result);
        true
    }

    /// Resets the slot to idle, forgetting its key.
    pub fn clear(&mut self) {
        self.key = None;
        self.state = QueryState::idle();
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> QueryState<T> {
        self.state.clone()
    }

    #[must_use]
    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    #[test]
    fn stale_result_is_ignored() {
        let mut slot: QuerySlot<&str> = QuerySlot::default();
        let first = slot.begin(QueryKey::Search("char".into()));
        let second = slot.begin(QueryKey::Search("chari".into()));

        assert!(slot.complete(&second, Ok("charizard")));
        assert!(!slot.complete(&first, Ok("charmander")));
        assert_eq!(slot.state().data, Some("charizard"));
    }

    #[test]
    fn reload_same_key_keeps_data() {
        let mut slot: QuerySlot<u32> = QuerySlot::default();
        let ticket = slot.begin(QueryKey::Page(1));
        slot.complete(&ticket, Ok(1));

        slot.begin(QueryKey::Page(1));
        let state = slot.state();
        assert!(state.loading);
        assert_eq!(state.data, Some(1));

        slot.begin(QueryKey::Page(2));
        assert_eq!(slot.state().data, None);
    }

    #[test]
    fn same_key_results_are_all_accepted() {
        let mut slot: QuerySlot<u32> = QuerySlot::default();
        let first = slot.begin(QueryKey::Page(1));
        let second = slot.begin(QueryKey::Page(1));

        assert!(slot.complete(&first, Ok(1)));
        assert!(slot.complete(&second, Ok(1)));
        assert_eq!(slot.state().data, Some(1));
    }

    #[test]
    fn failure_replaces_data() {
        let mut slot: QuerySlot<u32> = QuerySlot::default();
        let ticket = slot.begin(QueryKey::Page(3));
        slot.complete(&ticket, Err(RemoteError::new(ErrorKind::Timeout, "slow")));

        let state = slot.state();
        assert!(!state.loading);
        assert_eq!(state.error.map(|e| e.kind), Some(ErrorKind::Timeout));
    }

    #[test]
    fn clear_invalidates_outstanding_tickets() {
        let mut slot: QuerySlot<u32> = QuerySlot::default();
        let ticket = slot.begin(QueryKey::Category("fire".into()));
        slot.clear();
        assert!(!slot.complete(&ticket, Ok(9)));
        assert_eq!(slot.state(), QueryState::idle());
    }
}
