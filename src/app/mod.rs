//! Application layer: view state, list assembly and event handling.
//!
//! # Architecture
//!
//! ```text
//! Input → Event → handle_event → address / store writes → Actions
//!                                                          ↓
//!                 ListLoaded ← assemble ← Explorer (cached remote queries)
//! ```
//!
//! # Modules
//!
//! - [`view`]: list view state, sort keys and list mode selection
//! - [`url_state`]: query-parameter adapter over an addressable location
//! - [`engine`]: pure list assembly
//! - [`explorer`]: runs the remote queries a view needs
//! - [`state`]: interactive application state
//! - [`handler`]: event processing
//! - [`actions`]: follow-up work emitted by the handler

pub mod actions;
pub mod engine;
pub mod explorer;
pub mod handler;
pub mod state;
pub mod url_state;
pub mod view;

pub use actions::Action;
pub use engine::{assemble, ListOutput, ListSources};
pub use explorer::{Explorer, ExplorerSettings};
pub use handler::{handle_event, Event};
pub use state::AppState;
pub use url_state::{AddressableState, Detached, QueryParams, UrlQuery, UrlState};
pub use view::{parse_category, ListMode, ListViewState, SortKey, CATEGORIES, PAGE_SIZE};
