//! Mutation coordinator: optimistic write, remote call, confirm or roll back.
//!
//! Every mutation follows the same protocol:
//!
//! 1. Allocate a sequence number and apply the optimistic write to the cache,
//!    claiming ownership of the fields (or the ordering) it touched.
//! 2. Issue the remote call. The cache lock is not held while it runs.
//! 3. On success, release ownership. On failure, revert only what the
//!    operation still owns, publish a notice, and return the error.
//!
//! There is no automatic retry.

use crate::cache::{ChangeCause, LocalCache};
use crate::error::{SyncError, SyncResult};
use crate::notify::{Notice, Notifier};
use crate::pending::{OperationKind, PendingOperation, Undo};
use crate::reconcile::DriftReport;
use crate::remote::RemoteCollection;
use crate::session::SyncConfig;
use crate::state::CollectionState;
use crate::status::StatusBoard;
use curator_types::{
    move_down, move_item, move_up, validate_reorder, CollectionKey, EntityId, FieldPatch,
    OrderPair, OrderedEntity,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs optimistic mutations for one collection.
pub struct MutationCoordinator<E: OrderedEntity> {
    key: CollectionKey,
    cache: Arc<LocalCache>,
    remote: Arc<dyn RemoteCollection<E>>,
    notifier: Arc<dyn Notifier>,
    status: StatusBoard,
    config: SyncConfig,
}

impl<E: OrderedEntity> MutationCoordinator<E> {
    pub fn new(
        key: CollectionKey,
        cache: Arc<LocalCache>,
        remote: Arc<dyn RemoteCollection<E>>,
        notifier: Arc<dyn Notifier>,
        config: SyncConfig,
    ) -> Self {
        Self {
            key,
            cache,
            remote,
            notifier,
            status: StatusBoard::new(),
            config,
        }
    }

    pub fn key(&self) -> &CollectionKey {
        &self.key
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Cached items in display order; empty if never loaded.
    pub async fn snapshot(&self) -> SyncResult<Vec<E>> {
        Ok(self.cache.snapshot(&self.key).await?.unwrap_or_default())
    }

    // ── Loading ─────────────────────────────────────────────────

    /// Fetches the collection and replaces the cached copy.
    pub async fn load(&self) -> SyncResult<Vec<E>> {
        let items = self.remote.list().await?;
        info!("Loaded {} items into {}", items.len(), self.key);
        self.cache.store(&self.key, items).await?;
        self.snapshot().await
    }

    /// Returns the cached collection, fetching it if absent or stale.
    pub async fn ensure_loaded(&self) -> SyncResult<Vec<E>> {
        if self.cache.is_fresh::<E>(&self.key).await? {
            return self.snapshot().await;
        }
        self.load().await
    }

    /// Marks the collection stale. Returns false if it was never loaded.
    pub async fn invalidate(&self) -> SyncResult<bool> {
        self.cache.invalidate::<E>(&self.key).await
    }

    /// Drops the cached collection. Refused while operations are in flight,
    /// since their settlement needs the entry.
    pub async fn evict(&self) -> SyncResult<bool> {
        let busy = self
            .cache
            .read::<E, _, _>(&self.key, |state| state.in_flight() > 0)
            .await?
            .unwrap_or(false);
        if busy {
            return Err(SyncError::Conflict(format!(
                "{} has operations in flight",
                self.key
            )));
        }
        Ok(self.cache.evict(&self.key).await)
    }

    /// Re-fetches and diffs against the cache. The remote listing replaces
    /// the cache only when nothing is in flight for this collection.
    pub async fn reconcile(&self) -> SyncResult<DriftReport> {
        let remote = self.remote.list().await?;
        if self.cache.snapshot::<E>(&self.key).await?.is_none() {
            let report = DriftReport {
                remote_only: remote.iter().map(|item| item.id().clone()).collect(),
                applied: true,
                ..DriftReport::default()
            };
            self.cache.store(&self.key, remote).await?;
            return Ok(report);
        }

        let report = self
            .cache
            .write(&self.key, ChangeCause::Loaded, |state: &mut CollectionState<E>| {
                let mut report = DriftReport::between(state.items(), &remote);
                if state.in_flight() == 0 {
                    state.replace_items(remote);
                    report.applied = true;
                }
                Ok(report)
            })
            .await?;

        if report.is_clean() {
            debug!("Reconciled {}: no drift", self.key);
        } else {
            info!(
                "Reconciled {}: {} local-only, {} remote-only, {} changed, {} reordered (applied: {})",
                self.key,
                report.local_only.len(),
                report.remote_only.len(),
                report.changed.len(),
                report.reordered.len(),
                report.applied
            );
        }
        Ok(report)
    }

    // ── Create ──────────────────────────────────────────────────

    /// Appends `draft` under a placeholder id, then swaps in the entity the
    /// remote store returns.
    pub async fn create(&self, draft: E) -> SyncResult<E> {
        let kind = OperationKind::Create;
        let seq = self.cache.next_seq();
        let placeholder = EntityId::placeholder();

        let written = self
            .cache
            .write(&self.key, ChangeCause::Optimistic, |state: &mut CollectionState<E>| {
                let mut item = draft;
                item.set_id(placeholder.clone());
                item.set_order(state.items().len() as u32);
                state.push(item.clone());
                state.begin();
                Ok(item)
            })
            .await;
        let optimistic = match written {
            Ok(item) => item,
            Err(err) => return Err(self.reject(kind, err)),
        };
        let op = PendingOperation::new(seq, kind, self.key.clone(), Undo::Create {
            placeholder: placeholder.clone(),
        });
        self.status.begin(kind);
        debug!("Create #{} in {} as {}", seq, self.key, placeholder);

        match self.remote.create(&optimistic).await {
            Ok(created) => {
                let confirmed = created.clone();
                let result = self
                    .cache
                    .write(&self.key, ChangeCause::Confirmed, move |state: &mut CollectionState<E>| {
                        if state.replace(&placeholder, created) {
                            state.sort();
                        } else {
                            debug!("Placeholder {} left before confirmation", placeholder);
                        }
                        op.confirm(state);
                        Ok(())
                    })
                    .await;
                if let Err(e) = result {
                    warn!("Could not confirm create #{} in {}: {}", seq, self.key, e);
                }
                self.succeed(kind);
                info!("Created {} in {}", confirmed.id(), self.key);
                Ok(confirmed)
            }
            Err(err) => Err(self.fail(op, err).await),
        }
    }

    // ── Update / toggle ─────────────────────────────────────────

    /// Merges `patch` into the cached entity, then sends it.
    pub async fn update(&self, id: &EntityId, patch: FieldPatch) -> SyncResult<E> {
        self.patch(OperationKind::Update, id, patch).await
    }

    /// Flips the entity's visibility flag.
    pub async fn toggle_active(&self, id: &EntityId, active: bool) -> SyncResult<E> {
        let patch = FieldPatch::single(E::ACTIVE_FIELD, active);
        self.patch(OperationKind::ToggleActive, id, patch).await
    }

    async fn patch(&self, kind: OperationKind, id: &EntityId, patch: FieldPatch) -> SyncResult<E> {
        if let Err(e) = patch.check_protected() {
            return Err(self.reject(kind, e.into()));
        }
        if id.is_placeholder() {
            return Err(self.reject(kind, SyncError::Conflict(format!("{id} is not saved yet"))));
        }

        let seq = self.cache.next_seq();
        let key = &self.key;
        let written = self
            .cache
            .write(key, ChangeCause::Optimistic, |state: &mut CollectionState<E>| {
                let current = state
                    .get(id)
                    .ok_or_else(|| SyncError::Conflict(format!("{id} is no longer in {key}")))?;
                let prior = patch.inverse(current)?;
                let updated = patch.apply(current)?;
                state.put(updated.clone());
                state.claim_fields(id, &prior, seq);
                state.begin();
                Ok(updated)
            })
            .await;
        let updated = match written {
            Ok(updated) => updated,
            Err(err) => return Err(self.reject(kind, err)),
        };
        let op = PendingOperation::new(seq, kind, self.key.clone(), Undo::Update { id: id.clone() });
        self.status.begin(kind);
        debug!("{} #{} on {} in {}", kind, seq, id, self.key);

        match self.remote.update(id, &patch).await {
            Ok(stored) => {
                if let Some(stored) = stored {
                    if !stored.content_eq(&updated) {
                        debug!(
                            "Remote copy of {} drifted from the optimistic write; keeping local",
                            id
                        );
                    }
                }
                self.confirm(op).await;
                self.succeed(kind);
                Ok(updated)
            }
            Err(err) => Err(self.fail(op, err).await),
        }
    }

    // ── Delete ──────────────────────────────────────────────────

    /// Removes the entity without renumbering the rest.
    pub async fn remove(&self, id: &EntityId) -> SyncResult<()> {
        let kind = OperationKind::Delete;
        if id.is_placeholder() {
            return Err(self.reject(kind, SyncError::Conflict(format!("{id} is not saved yet"))));
        }

        let seq = self.cache.next_seq();
        let key = &self.key;
        let written = self
            .cache
            .write(key, ChangeCause::Optimistic, |state: &mut CollectionState<E>| {
                let removed = state
                    .remove(id)
                    .ok_or_else(|| SyncError::Conflict(format!("{id} is no longer in {key}")))?;
                state.begin();
                Ok(removed)
            })
            .await;
        let (index, entity) = match written {
            Ok(removed) => removed,
            Err(err) => return Err(self.reject(kind, err)),
        };
        let op = PendingOperation::new(seq, kind, self.key.clone(), Undo::Delete { entity, index });
        self.status.begin(kind);
        debug!("Delete #{} of {} in {}", seq, id, self.key);

        match self.remote.delete(id).await {
            Ok(()) => {
                self.confirm(op).await;
                self.succeed(kind);
                info!("Deleted {} from {}", id, self.key);
                Ok(())
            }
            Err(err) => Err(self.fail(op, err).await),
        }
    }

    // ── Reorder ─────────────────────────────────────────────────

    /// Applies a complete ordering and sends it immediately.
    pub async fn reorder(&self, pairs: Vec<OrderPair>) -> SyncResult<()> {
        let op = self.begin_reorder(&pairs).await?;
        self.commit_reorder(op, pairs).await
    }

    /// Moves the item at `from` to `to`. Out-of-range indices are rejected.
    pub async fn move_item(&self, from: usize, to: usize) -> SyncResult<()> {
        let items = self.snapshot().await?;
        let pairs = move_item(&items, from, to).map_err(|e| self.reject(OperationKind::Reorder, e.into()))?;
        self.reorder(pairs).await
    }

    /// Swaps `id` with its predecessor. Returns false at the top boundary.
    pub async fn move_up(&self, id: &EntityId) -> SyncResult<bool> {
        let items = self.snapshot().await?;
        match move_up(&items, id) {
            Some(pairs) => self.reorder(pairs).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Swaps `id` with its successor. Returns false at the bottom boundary.
    pub async fn move_down(&self, id: &EntityId) -> SyncResult<bool> {
        let items = self.snapshot().await?;
        match move_down(&items, id) {
            Some(pairs) => self.reorder(pairs).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Validates `pairs`, applies them to the cache, and opens a pending
    /// reorder whose undo record is the ordering before this call.
    pub(crate) async fn begin_reorder(&self, pairs: &[OrderPair]) -> SyncResult<PendingOperation<E>> {
        let kind = OperationKind::Reorder;
        let seq = self.cache.next_seq();
        let written = self
            .cache
            .write(&self.key, ChangeCause::Optimistic, |state: &mut CollectionState<E>| {
                check_reorder(state, pairs)?;
                let prior = state.ordering();
                state.apply_ordering(pairs);
                state.claim_order(seq, prior);
                state.begin();
                Ok(())
            })
            .await;
        if let Err(err) = written {
            return Err(self.reject(kind, err));
        }
        self.status.begin(kind);
        debug!("Reorder #{} opened for {}", seq, self.key);
        Ok(PendingOperation::new(seq, kind, self.key.clone(), Undo::Reorder))
    }

    /// Applies a newer ordering to an open reorder, keeping its undo record.
    pub(crate) async fn extend_reorder(&self, op: &PendingOperation<E>, pairs: &[OrderPair]) -> SyncResult<()> {
        let seq = op.seq();
        let written = self
            .cache
            .write(&self.key, ChangeCause::Optimistic, |state: &mut CollectionState<E>| {
                check_reorder(state, pairs)?;
                let prior = state.ordering();
                state.apply_ordering(pairs);
                state.claim_order(seq, prior);
                Ok(())
            })
            .await;
        written.map_err(|err| self.reject(OperationKind::Reorder, err))
    }

    /// Sends the final ordering of `op` and settles it.
    ///
    /// The ordering sent is the cache's current display order, so a create or
    /// delete that landed while the reorder waited is folded in.
    pub(crate) async fn commit_reorder(&self, op: PendingOperation<E>, pairs: Vec<OrderPair>) -> SyncResult<()> {
        let seq = op.seq();
        let pairs = match self.settled_ordering(pairs).await {
            Ok(pairs) => pairs,
            Err(err) => return Err(self.fail(op, err).await),
        };
        debug!("Sending reorder #{} for {} ({} items)", seq, self.key, pairs.len());
        match self.remote.reorder(&pairs).await {
            Ok(()) => {
                self.confirm(op).await;
                self.succeed(OperationKind::Reorder);
                info!("Applied reorder for {}", self.key);
                Ok(())
            }
            Err(err) => Err(self.fail(op, err).await),
        }
    }

    /// `requested` if it still names exactly the saved items, otherwise the
    /// cache's display order renumbered `0..n`, which is then written back.
    async fn settled_ordering(&self, requested: Vec<OrderPair>) -> SyncResult<Vec<OrderPair>> {
        let current = self
            .cache
            .read::<E, _, _>(&self.key, CollectionState::dense_ordering)
            .await?
            .ok_or_else(|| SyncError::NotLoaded(self.key.clone()))?;
        if same_members(&current, &requested) {
            return Ok(requested);
        }

        debug!(
            "Collection {} changed while a reorder waited; sending {} items instead of {}",
            self.key,
            current.len(),
            requested.len()
        );
        self.cache
            .write(&self.key, ChangeCause::Optimistic, |state: &mut CollectionState<E>| {
                let current = state.dense_ordering();
                state.apply_ordering(&current);
                Ok(current)
            })
            .await
    }

    // ── Settlement ──────────────────────────────────────────────

    async fn confirm(&self, op: PendingOperation<E>) {
        let seq = op.seq();
        let result = self
            .cache
            .write(&self.key, ChangeCause::Confirmed, move |state: &mut CollectionState<E>| {
                op.confirm(state);
                Ok(())
            })
            .await;
        if let Err(e) = result {
            warn!("Could not confirm #{} in {}: {}", seq, self.key, e);
        }
    }

    /// Rolls `op` back and reports `err`. Returns `err` for propagation.
    async fn fail(&self, op: PendingOperation<E>, err: SyncError) -> SyncError {
        let kind = op.kind();
        let seq = op.seq();
        warn!("{} #{} in {} failed: {}", kind, seq, self.key, err);

        let result = self
            .cache
            .write(&self.key, ChangeCause::RolledBack, move |state: &mut CollectionState<E>| {
                op.rollback(state)
            })
            .await;
        if let Err(e) = result {
            warn!("Rollback of #{} in {} incomplete: {}", seq, self.key, e);
        }

        let notice = Notice::failure(kind, &self.key, &err);
        self.notifier.notify(&notice);
        self.status.fail(kind, notice);
        err
    }

    /// Reports a mutation refused before any optimistic write.
    fn reject(&self, kind: OperationKind, err: SyncError) -> SyncError {
        warn!("Rejected {} in {}: {}", kind, self.key, err);
        let notice = Notice::failure(kind, &self.key, &err);
        self.notifier.notify(&notice);
        self.status.begin(kind);
        self.status.fail(kind, notice);
        err
    }

    fn succeed(&self, kind: OperationKind) {
        self.status.succeed(kind);
        if self.config.notify_on_success {
            self.notifier.notify(&Notice::success(kind, &self.key));
        }
    }
}

fn same_members(a: &[OrderPair], b: &[OrderPair]) -> bool {
    let ids: HashSet<&EntityId> = a.iter().map(|pair| &pair.id).collect();
    a.len() == b.len() && b.iter().all(|pair| ids.contains(&pair.id))
}

/// A reorder must cover the saved collection exactly.
fn check_reorder<E: OrderedEntity>(state: &CollectionState<E>, pairs: &[OrderPair]) -> SyncResult<()> {
    if state.has_placeholders() {
        return Err(SyncError::Conflict(
            "cannot reorder while a new item is being saved".to_string(),
        ));
    }
    validate_reorder(state.items(), pairs)?;
    Ok(())
}
