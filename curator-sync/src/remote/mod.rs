//! Remote store abstraction.
//!
//! One [`RemoteCollection`] per managed collection. The engine never talks to
//! the network directly; it goes through this trait so tests can substitute
//! [`mock::MockRemote`].

mod http;
pub mod mock;

pub use http::{HttpCollection, HttpStore, HttpStoreConfig};

use crate::error::SyncResult;
use async_trait::async_trait;
use curator_types::{EntityId, FieldPatch, OrderPair, OrderedEntity};

/// CRUD plus bulk reorder against the remote source of truth.
#[async_trait]
pub trait RemoteCollection<E: OrderedEntity>: Send + Sync {
    /// Endpoint path of the collection, e.g. `/faqs`.
    fn endpoint(&self) -> &str;

    /// Fetches the whole collection.
    async fn list(&self) -> SyncResult<Vec<E>>;

    /// Creates an entity. Id and order of `draft` are advisory; the store may
    /// assign its own.
    async fn create(&self, draft: &E) -> SyncResult<E>;

    /// Applies a partial update. Returns the stored entity if the store sent
    /// one back.
    async fn update(&self, id: &EntityId, patch: &FieldPatch) -> SyncResult<Option<E>>;

    async fn delete(&self, id: &EntityId) -> SyncResult<()>;

    /// Replaces the whole ordering. `pairs` covers every id exactly once.
    async fn reorder(&self, pairs: &[OrderPair]) -> SyncResult<()>;
}
