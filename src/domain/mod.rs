//! Domain layer: catalog entities and error types.
//!
//! Nothing in here knows about HTTP, storage or rendering.
//!
//! - [`error`]: error types and result aliases
//! - [`entity`]: entity summary/detail models and resource-URL parsing

pub mod entity;
pub mod error;

pub use entity::{parse_resource_id, sprite_url, Ability, Entity, EntityDetails, Page, Stat};
pub use error::{DexError, ErrorKind, RemoteError, Result};
