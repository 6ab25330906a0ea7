//! Per-collection sync state.
//!
//! Besides the cached items, each collection keeps a stack of pending
//! writers per `(entity, field)` and for the ordering. Each layer remembers
//! the value beneath it, so operations can fail in any order: a failing top
//! layer restores what lies beneath, a failing inner layer hands its prior
//! value up to the layer above, and once every writer has failed the last
//! value the remote accepted is back.

use curator_types::{EntityId, FieldPatch, OrderPair, OrderedEntity};
use serde_json::Value;
use std::collections::HashMap;

/// One pending write and the value it covered.
#[derive(Debug, Clone)]
struct Layer<T> {
    seq: u64,
    prior: T,
}

/// Pending writers of one slot, oldest first.
///
/// The bottom layer's prior is the last accepted value; every other layer's
/// prior is the value written by the layer below it.
#[derive(Debug, Clone)]
struct Layers<T>(Vec<Layer<T>>);

impl<T> Default for Layers<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Layers<T> {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn contains(&self, seq: u64) -> bool {
        self.0.iter().any(|layer| layer.seq == seq)
    }

    fn top_is(&self, seq: u64) -> bool {
        self.0.last().is_some_and(|layer| layer.seq == seq)
    }

    /// Puts `seq` on top covering `prior`. A layer already on top keeps its
    /// original prior; an inner one is lifted to the top.
    fn claim(&mut self, seq: u64, prior: T) {
        if self.top_is(seq) {
            return;
        }
        self.withdraw(seq);
        self.0.push(Layer { seq, prior });
    }

    /// The remote accepted `seq`: its value becomes the base, so it and every
    /// older layer are dropped.
    fn confirm(&mut self, seq: u64) {
        if let Some(index) = self.0.iter().position(|layer| layer.seq == seq) {
            self.0.drain(..=index);
        }
    }

    /// The remote rejected `seq`. Returns the value to restore if `seq` was on
    /// top; otherwise its prior passes to the layer above and nothing visible
    /// changes.
    fn withdraw(&mut self, seq: u64) -> Option<T> {
        let index = self.0.iter().position(|layer| layer.seq == seq)?;
        let layer = self.0.remove(index);
        match self.0.get_mut(index) {
            Some(above) => {
                above.prior = layer.prior;
                None
            }
            None => Some(layer.prior),
        }
    }
}

/// Cached state of one collection.
#[derive(Debug, Clone)]
pub struct CollectionState<E> {
    items: Vec<E>,
    /// Set by `invalidate`; the next `ensure_loaded` refetches.
    stale: bool,
    /// Operations dispatched and not yet settled.
    in_flight: usize,
    field_layers: HashMap<(EntityId, String), Layers<Value>>,
    order_layers: Layers<Vec<OrderPair>>,
}

impl<E: OrderedEntity> CollectionState<E> {
    /// Creates state from a fetched list, sorted by order.
    pub fn new(mut items: Vec<E>) -> Self {
        items.sort_by_key(OrderedEntity::order);
        Self {
            items,
            stale: false,
            in_flight: 0,
            field_layers: HashMap::new(),
            order_layers: Layers::default(),
        }
    }

    /// Items in display order.
    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Replaces the items with a fresh list, keeping in-flight bookkeeping.
    /// Placeholders of creates still in flight stay at the end.
    pub(crate) fn replace_items(&mut self, mut items: Vec<E>) {
        items.sort_by_key(OrderedEntity::order);
        let unsaved: Vec<E> = self
            .items
            .drain(..)
            .filter(|item| item.id().is_placeholder())
            .collect();
        items.extend(unsaved);
        self.items = items;
        self.stale = false;
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub(crate) fn begin(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub(crate) fn push(&mut self, item: E) {
        self.items.push(item);
    }

    /// Overwrites the entity with the same id. Returns false if absent.
    pub(crate) fn put(&mut self, item: E) -> bool {
        match self.position(item.id()) {
            Some(index) => {
                self.items[index] = item;
                true
            }
            None => false,
        }
    }

    /// Replaces the entity `id` with `item`, which may carry a new id.
    pub(crate) fn replace(&mut self, id: &EntityId, item: E) -> bool {
        match self.position(id) {
            Some(index) => {
                self.items[index] = item;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &EntityId) -> Option<(usize, E)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Inserts at `index`, clamped to the current length.
    pub(crate) fn insert_at(&mut self, index: usize, item: E) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Sets the order of `id`. Returns false if absent.
    pub(crate) fn set_order(&mut self, id: &EntityId, order: u32) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.set_order(order);
                true
            }
            None => false,
        }
    }

    /// Stable sort by order; ties keep their array position.
    pub(crate) fn sort(&mut self) {
        self.items.sort_by_key(OrderedEntity::order);
    }

    /// Current `{id, order}` of every item, gaps included.
    pub fn ordering(&self) -> Vec<OrderPair> {
        self.items
            .iter()
            .map(|item| OrderPair::new(item.id().clone(), item.order()))
            .collect()
    }

    /// Rewrites the orders named in `pairs` and re-sorts, in one step.
    pub(crate) fn apply_ordering(&mut self, pairs: &[OrderPair]) {
        for pair in pairs {
            self.set_order(&pair.id, pair.order);
        }
        self.sort();
    }

    /// Saved items in display order, numbered `0..n`.
    pub fn dense_ordering(&self) -> Vec<OrderPair> {
        self.items
            .iter()
            .filter(|item| !item.id().is_placeholder())
            .enumerate()
            .map(|(index, item)| OrderPair::new(item.id().clone(), index as u32))
            .collect()
    }

    pub fn has_placeholders(&self) -> bool {
        self.items.iter().any(|item| item.id().is_placeholder())
    }

    // ── Ownership ────────────────────────────────────────────────

    /// Layers `seq` over every field of `prior`, which holds the values the
    /// fields had before this write.
    pub(crate) fn claim_fields(&mut self, id: &EntityId, prior: &FieldPatch, seq: u64) {
        for field in prior.fields() {
            let value = prior.get(field).cloned().unwrap_or(Value::Null);
            self.field_layers
                .entry((id.clone(), field.to_string()))
                .or_default()
                .claim(seq, value);
        }
    }

    /// True if `seq` is the latest pending writer of the field.
    pub fn owns_field(&self, id: &EntityId, field: &str, seq: u64) -> bool {
        self.field_layers
            .get(&(id.clone(), field.to_string()))
            .is_some_and(|layers| layers.top_is(seq))
    }

    pub(crate) fn confirm_fields(&mut self, seq: u64) {
        for layers in self.field_layers.values_mut() {
            layers.confirm(seq);
        }
        self.field_layers.retain(|_, layers| !layers.is_empty());
    }

    /// Withdraws `seq` from every field it wrote and returns, per entity, the
    /// values to put back.
    pub(crate) fn revert_fields(&mut self, seq: u64) -> Vec<(EntityId, FieldPatch)> {
        let mut restore: HashMap<EntityId, FieldPatch> = HashMap::new();
        for ((id, field), layers) in self.field_layers.iter_mut() {
            if !layers.contains(seq) {
                continue;
            }
            if let Some(prior) = layers.withdraw(seq) {
                restore.entry(id.clone()).or_default().insert(field.clone(), prior);
            }
        }
        self.field_layers.retain(|_, layers| !layers.is_empty());
        restore.into_iter().collect()
    }

    /// Layers `seq` over the ordering; `prior` is the ordering it replaced.
    pub(crate) fn claim_order(&mut self, seq: u64, prior: Vec<OrderPair>) {
        self.order_layers.claim(seq, prior);
    }

    /// True if `seq` is the latest pending writer of the ordering.
    pub fn owns_order(&self, seq: u64) -> bool {
        self.order_layers.top_is(seq)
    }

    pub(crate) fn confirm_order(&mut self, seq: u64) {
        self.order_layers.confirm(seq);
    }

    /// Withdraws `seq` from the ordering, returning the ordering to restore
    /// if it was the latest writer.
    pub(crate) fn revert_order(&mut self, seq: u64) -> Option<Vec<OrderPair>> {
        self.order_layers.withdraw(seq)
    }

    /// Drops claims on an entity that left the collection.
    pub(crate) fn forget(&mut self, id: &EntityId) {
        self.field_layers.retain(|(owner_id, _), _| owner_id != id);
    }
}
