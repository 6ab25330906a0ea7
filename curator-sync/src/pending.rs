//! Pending operations and their undo records.

use crate::error::SyncResult;
use crate::state::CollectionState;
use curator_types::{CollectionKey, EntityId, OrderedEntity};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The user-visible mutation categories tracked by the status board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    ToggleActive,
    Delete,
    Reorder,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        Self::Create,
        Self::Update,
        Self::ToggleActive,
        Self::Delete,
        Self::Reorder,
    ];

    /// Present participle used in notices ("saving", "deleting", ...).
    pub fn verb(self) -> &'static str {
        match self {
            Self::Create => "creating",
            Self::Update => "saving",
            Self::ToggleActive => "changing visibility of",
            Self::Delete => "deleting",
            Self::Reorder => "reordering",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::ToggleActive => "toggle_active",
            Self::Delete => "delete",
            Self::Reorder => "reorder",
        };
        f.write_str(name)
    }
}

/// What is needed to revert one optimistic write.
#[derive(Debug, Clone)]
pub(crate) enum Undo<E> {
    Create { placeholder: EntityId },
    Update { id: EntityId },
    Delete { entity: E, index: usize },
    Reorder,
}

/// An optimistic write that has been applied locally and awaits the remote
/// outcome.
///
/// Settling consumes the operation, so an operation rolls back at most once.
#[derive(Debug)]
pub struct PendingOperation<E> {
    seq: u64,
    kind: OperationKind,
    collection: CollectionKey,
    undo: Undo<E>,
}

impl<E: OrderedEntity> PendingOperation<E> {
    pub(crate) fn new(seq: u64, kind: OperationKind, collection: CollectionKey, undo: Undo<E>) -> Self {
        Self {
            seq,
            kind,
            collection,
            undo,
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn collection(&self) -> &CollectionKey {
        &self.collection
    }

    /// Entity the operation targets; `None` for reorders.
    pub fn target(&self) -> Option<&EntityId> {
        match &self.undo {
            Undo::Create { placeholder } => Some(placeholder),
            Undo::Update { id } => Some(id),
            Undo::Delete { entity, .. } => Some(entity.id()),
            Undo::Reorder => None,
        }
    }

    /// Reverts this operation's own delta, leaving newer writes intact.
    ///
    /// Field and ordering writes are withdrawn from their claim layers: only
    /// a write nothing newer has covered is put back.
    pub(crate) fn rollback(self, state: &mut CollectionState<E>) -> SyncResult<()> {
        let seq = self.seq;
        let mut outcome = Ok(());
        match &self.undo {
            Undo::Create { placeholder } => {
                if state.remove(placeholder).is_none() {
                    debug!("Placeholder {} already gone", placeholder);
                }
            }
            Undo::Delete { entity, index } => {
                if state.position(entity.id()).is_none() {
                    state.insert_at(*index, entity.clone());
                }
            }
            Undo::Update { .. } | Undo::Reorder => {}
        }

        let restore = state.revert_fields(seq);
        if matches!(self.undo, Undo::Update { .. }) && restore.is_empty() {
            debug!("Update #{} superseded; nothing to revert", seq);
        }
        for (id, prior) in restore {
            let reverted = match state.get(&id) {
                Some(current) => prior.apply(current),
                None => continue,
            };
            match reverted {
                Ok(item) => {
                    state.put(item);
                }
                Err(e) => outcome = Err(e.into()),
            }
        }

        match state.revert_order(seq) {
            Some(prior) => state.apply_ordering(&prior),
            None if matches!(self.undo, Undo::Reorder) => {
                debug!("Reorder #{} superseded; keeping newer ordering", seq);
            }
            None => {}
        }
        state.finish();
        outcome
    }

    /// Drops the operation's ownership claims after the remote confirmed it.
    pub(crate) fn confirm(self, state: &mut CollectionState<E>) {
        state.confirm_fields(self.seq);
        state.confirm_order(self.seq);
        if let Undo::Delete { entity, .. } = &self.undo {
            state.forget(entity.id());
        }
        state.finish();
    }
}
