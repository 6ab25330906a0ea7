//! The per-collection surface a list view binds to.

use crate::cache::LocalCache;
use crate::coordinator::MutationCoordinator;
use crate::debounce::ReorderDebouncer;
use crate::error::{SyncError, SyncResult};
use crate::notify::Notifier;
use crate::pending::OperationKind;
use crate::reconcile::DriftReport;
use crate::remote::RemoteCollection;
use crate::session::SyncConfig;
use crate::status::MutationStatus;
use curator_types::{move_down, move_item, move_up, CollectionKey, EntityId, FieldPatch, OrderPair, OrderedEntity};
use std::sync::Arc;

/// Mutations, reads, and status for one collection.
///
/// Position changes made through this handle go through its debouncer, so a
/// drag burst produces one remote reorder.
pub struct CollectionHandle<E: OrderedEntity> {
    coordinator: Arc<MutationCoordinator<E>>,
    debouncer: ReorderDebouncer<E>,
}

impl<E: OrderedEntity> CollectionHandle<E> {
    pub fn new(
        key: CollectionKey,
        cache: Arc<LocalCache>,
        remote: Arc<dyn RemoteCollection<E>>,
        notifier: Arc<dyn Notifier>,
        config: SyncConfig,
    ) -> Self {
        let delay = config.debounce();
        let coordinator = Arc::new(MutationCoordinator::new(key, cache, remote, notifier, config));
        let debouncer = ReorderDebouncer::new(Arc::clone(&coordinator), delay);
        Self {
            coordinator,
            debouncer,
        }
    }

    pub fn key(&self) -> &CollectionKey {
        self.coordinator.key()
    }

    pub fn coordinator(&self) -> &Arc<MutationCoordinator<E>> {
        &self.coordinator
    }

    // ── Reads ───────────────────────────────────────────────────

    pub async fn snapshot(&self) -> SyncResult<Vec<E>> {
        self.coordinator.snapshot().await
    }

    pub async fn ensure_loaded(&self) -> SyncResult<Vec<E>> {
        self.coordinator.ensure_loaded().await
    }

    pub async fn reload(&self) -> SyncResult<Vec<E>> {
        self.coordinator.load().await
    }

    pub async fn invalidate(&self) -> SyncResult<bool> {
        self.coordinator.invalidate().await
    }

    pub async fn evict(&self) -> SyncResult<bool> {
        self.coordinator.evict().await
    }

    pub async fn reconcile(&self) -> SyncResult<DriftReport> {
        self.coordinator.reconcile().await
    }

    pub fn status(&self, kind: OperationKind) -> MutationStatus {
        self.coordinator.status().status(kind)
    }

    /// True while any mutation of this collection is in flight.
    pub fn is_busy(&self) -> bool {
        self.coordinator.status().is_busy()
    }

    // ── Mutations ───────────────────────────────────────────────

    pub async fn create(&self, draft: E) -> SyncResult<E> {
        self.coordinator.create(draft).await
    }

    pub async fn update(&self, id: &EntityId, patch: FieldPatch) -> SyncResult<E> {
        self.coordinator.update(id, patch).await
    }

    pub async fn remove(&self, id: &EntityId) -> SyncResult<()> {
        self.coordinator.remove(id).await
    }

    pub async fn toggle_active(&self, id: &EntityId, active: bool) -> SyncResult<E> {
        self.coordinator.toggle_active(id, active).await
    }

    pub async fn publish(&self, id: &EntityId) -> SyncResult<E> {
        self.toggle_active(id, true).await
    }

    pub async fn unpublish(&self, id: &EntityId) -> SyncResult<E> {
        self.toggle_active(id, false).await
    }

    // ── Ordering ────────────────────────────────────────────────

    /// Applies `pairs` and sends them now, folding in any open window.
    pub async fn reorder(&self, pairs: Vec<OrderPair>) -> SyncResult<()> {
        self.debouncer.schedule(pairs).await?;
        self.debouncer.flush().await
    }

    /// Applies `pairs` now and sends them once the burst settles.
    pub async fn schedule_reorder(&self, pairs: Vec<OrderPair>) -> SyncResult<()> {
        self.debouncer.schedule(pairs).await
    }

    /// Drag and drop from `from` to `to`, debounced.
    pub async fn move_item(&self, from: usize, to: usize) -> SyncResult<()> {
        let items = self.snapshot().await?;
        let pairs = move_item(&items, from, to).map_err(SyncError::from)?;
        self.schedule_reorder(pairs).await
    }

    /// Swaps `id` with its predecessor, debounced. False at the top.
    pub async fn move_up(&self, id: &EntityId) -> SyncResult<bool> {
        let items = self.snapshot().await?;
        match move_up(&items, id) {
            Some(pairs) => self.schedule_reorder(pairs).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Swaps `id` with its successor, debounced. False at the bottom.
    pub async fn move_down(&self, id: &EntityId) -> SyncResult<bool> {
        let items = self.snapshot().await?;
        match move_down(&items, id) {
            Some(pairs) => self.schedule_reorder(pairs).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Sends an open reorder window now. Call when the list view unmounts.
    pub async fn flush(&self) -> SyncResult<()> {
        self.debouncer.flush().await
    }

    pub async fn has_pending_reorder(&self) -> bool {
        self.debouncer.has_pending().await
    }
}
