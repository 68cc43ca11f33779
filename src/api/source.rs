//! Remote data source abstraction.
//!
//! The [`DataSource`] trait is the seam between the explorer and the remote
//! API. [`crate::api::PokeApiClient`] talks HTTP; tests plug in scripted
//! fakes. Every method classifies its own failures into a
//! [`RemoteError`] with a message specific to the resource asked for.

use crate::domain::{Entity, EntityDetails, Page, RemoteError};
use async_trait::async_trait;

/// Read-only access to the catalog API.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches one page of the paginated index, ordered by ascending id.
    async fn list_page(&self, offset: u32, limit: u32) -> Result<Page<Entity>, RemoteError>;

    /// Fetches the full name index used as the client-side search corpus.
    ///
    /// `limit` bounds the size of the single page requested.
    async fn name_index(&self, limit: u32) -> Result<Vec<Entity>, RemoteError>;

    /// Fetches every entity carrying `category`, in API order.
    async fn category_index(&self, category: &str) -> Result<Vec<Entity>, RemoteError>;

    /// Fetches the full record for an id (or name) taken from a link.
    async fn entity_by_id(&self, id: &str) -> Result<EntityDetails, RemoteError>;

    /// Looks an entity up by the name a user typed.
    async fn entity_by_name(&self, name: &str) -> Result<EntityDetails, RemoteError>;

    /// Returns `true` if the API answers a minimal list request.
    async fn ping(&self) -> bool;
}
