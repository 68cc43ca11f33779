//! Remote catalog API access.
//!
//! - `source`: the [`DataSource`] trait the rest of the crate depends on
//! - `client`: [`PokeApiClient`], the reqwest implementation
//! - `models`: wire shapes of the JSON responses

pub mod client;
pub mod models;
pub mod source;

pub use client::{PokeApiClient, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
pub use source::DataSource;
