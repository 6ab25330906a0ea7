//! In-memory remote store for tests.
//!
//! Behaves like a well-formed remote: assigns ids and append-at-end orders,
//! applies patches, validates reorders. Responses can be scripted to fail or
//! to be held until released, which lets a test complete operations out of
//! issuance order.

use super::RemoteCollection;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use curator_types::{validate_reorder, EntityId, FieldPatch, OrderPair, OrderedEntity};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// A request the mock received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    List,
    Create(EntityId),
    Update { id: EntityId, patch: FieldPatch },
    Delete(EntityId),
    Reorder(Vec<OrderPair>),
}

/// Scripted behavior for the next request.
enum Step {
    Fail(SyncError),
    Hold(oneshot::Receiver<Option<SyncError>>),
}

/// Releases one held response.
#[derive(Debug)]
pub struct Latch {
    tx: oneshot::Sender<Option<SyncError>>,
}

impl Latch {
    /// Lets the held request proceed normally.
    pub fn release(self) {
        let _ = self.tx.send(None);
    }

    /// Completes the held request with `err`.
    pub fn fail(self, err: SyncError) {
        let _ = self.tx.send(Some(err));
    }
}

struct MockState<E> {
    items: Vec<E>,
    calls: Vec<RemoteCall>,
    script: VecDeque<Step>,
    next_id: u64,
}

/// A mock remote collection.
pub struct MockRemote<E> {
    endpoint: String,
    state: Mutex<MockState<E>>,
}

impl<E: OrderedEntity> Default for MockRemote<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: OrderedEntity> MockRemote<E> {
    /// Creates an empty mock at `/{COLLECTION}`.
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Creates a mock holding `items`.
    pub fn with_items(items: Vec<E>) -> Self {
        Self {
            endpoint: format!("/{}", E::COLLECTION),
            state: Mutex::new(MockState {
                items,
                calls: Vec::new(),
                script: VecDeque::new(),
                next_id: 1,
            }),
        }
    }

    /// Locks the state, ignoring poisoning.
    fn state(&self) -> MutexGuard<'_, MockState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state().calls.clone()
    }

    /// Orderings sent through `reorder`, in arrival order.
    pub fn reorder_calls(&self) -> Vec<Vec<OrderPair>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RemoteCall::Reorder(pairs) => Some(pairs),
                _ => None,
            })
            .collect()
    }

    /// Current remote contents, sorted by order.
    pub fn items(&self) -> Vec<E> {
        let mut items = self.state().items.clone();
        items.sort_by_key(OrderedEntity::order);
        items
    }

    /// Overwrites remote contents, as if another actor had edited them.
    pub fn set_items(&self, items: Vec<E>) {
        self.state().items = items;
    }

    /// Makes the next request fail with `err` without touching remote state.
    pub fn fail_next(&self, err: SyncError) {
        self.state().script.push_back(Step::Fail(err));
    }

    /// Holds the next request until the returned latch is released or failed.
    pub fn hold_next(&self) -> Latch {
        let (tx, rx) = oneshot::channel();
        self.state().script.push_back(Step::Hold(rx));
        Latch { tx }
    }

    /// Records `call` and runs the scripted step, if any.
    async fn enter(&self, call: RemoteCall) -> SyncResult<()> {
        let step = {
            let mut state = self.state();
            state.calls.push(call);
            state.script.pop_front()
        };
        match step {
            None => Ok(()),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Hold(rx)) => match rx.await {
                Ok(None) => Ok(()),
                Ok(Some(err)) => Err(err),
                Err(_) => Err(SyncError::Transport("held response dropped".into())),
            },
        }
    }
}

#[async_trait]
impl<E: OrderedEntity> RemoteCollection<E> for MockRemote<E> {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn list(&self) -> SyncResult<Vec<E>> {
        self.enter(RemoteCall::List).await?;
        Ok(self.items())
    }

    async fn create(&self, draft: &E) -> SyncResult<E> {
        self.enter(RemoteCall::Create(draft.id().clone())).await?;
        let mut state = self.state();
        let mut created = draft.clone();
        created.set_id(EntityId::new(format!("m{}", state.next_id)));
        created.set_order(state.items.len() as u32);
        state.next_id += 1;
        state.items.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &EntityId, patch: &FieldPatch) -> SyncResult<Option<E>> {
        self.enter(RemoteCall::Update {
            id: id.clone(),
            patch: patch.clone(),
        })
        .await?;
        let mut state = self.state();
        let slot = state
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| SyncError::from_status(404, &format!("no entity {id}")))?;
        *slot = patch.apply(slot)?;
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: &EntityId) -> SyncResult<()> {
        self.enter(RemoteCall::Delete(id.clone())).await?;
        let mut state = self.state();
        let before = state.items.len();
        state.items.retain(|item| item.id() != id);
        if state.items.len() == before {
            return Err(SyncError::from_status(404, &format!("no entity {id}")));
        }
        Ok(())
    }

    async fn reorder(&self, pairs: &[OrderPair]) -> SyncResult<()> {
        self.enter(RemoteCall::Reorder(pairs.to_vec())).await?;
        let mut state = self.state();
        validate_reorder(&state.items, pairs)
            .map_err(|e| SyncError::from_status(422, &e.to_string()))?;
        for pair in pairs {
            if let Some(item) = state.items.iter_mut().find(|item| item.id() == &pair.id) {
                item.set_order(pair.order);
            }
        }
        Ok(())
    }
}
