//! Remote query plumbing: keyed caching with in-flight sharing, retry
//! policies, latest-key-wins slots and search debouncing.

pub mod cache;
pub mod debounce;
pub mod key;
pub mod slot;
pub mod state;

pub use cache::{QueryCache, RetryPolicy};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use key::QueryKey;
pub use slot::{QuerySlot, Ticket};
pub use state::QueryState;
