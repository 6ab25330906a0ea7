//! Dense ordering helpers.
//!
//! A collection's ordering is dense: `N` items carry exactly the orders
//! `0..N`. Every helper here takes items in display order and produces a
//! complete `{id, order}` mapping covering the whole collection, which is the
//! only shape the reorder endpoint accepts.

use crate::{EntityId, Error, OrderedEntity, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of a complete reorder request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderPair {
    pub id: EntityId,
    pub order: u32,
}

impl OrderPair {
    pub fn new(id: impl Into<EntityId>, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
        }
    }
}

/// Returns true if `orders` is exactly `{0, ..., n-1}` with no duplicates.
pub fn is_dense(orders: impl IntoIterator<Item = u32>) -> bool {
    let orders: Vec<u32> = orders.into_iter().collect();
    let n = orders.len();
    let mut seen = vec![false; n];
    for order in orders {
        match seen.get_mut(order as usize) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Assigns `0..n` to `items` in their current sequence.
pub fn normalized_pairs<E: OrderedEntity>(items: &[E]) -> Vec<OrderPair> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| OrderPair::new(item.id().clone(), i as u32))
        .collect()
}

/// Moves the item at `from` to index `to` (drag and drop), returning the
/// resulting dense ordering.
pub fn move_item<E: OrderedEntity>(items: &[E], from: usize, to: usize) -> Result<Vec<OrderPair>> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(Error::InvalidOrdering(format!(
            "move {from} -> {to} out of range for {len} items"
        )));
    }
    let mut ids: Vec<&EntityId> = items.iter().map(OrderedEntity::id).collect();
    let moved = ids.remove(from);
    ids.insert(to, moved);
    Ok(ids
        .into_iter()
        .enumerate()
        .map(|(i, id)| OrderPair::new(id.clone(), i as u32))
        .collect())
}

/// Swaps `id` with its predecessor. Returns `None` if `id` is first or absent.
pub fn move_up<E: OrderedEntity>(items: &[E], id: &EntityId) -> Option<Vec<OrderPair>> {
    let index = items.iter().position(|item| item.id() == id)?;
    if index == 0 {
        return None;
    }
    move_item(items, index, index - 1).ok()
}

/// Swaps `id` with its successor. Returns `None` if `id` is last or absent.
pub fn move_down<E: OrderedEntity>(items: &[E], id: &EntityId) -> Option<Vec<OrderPair>> {
    let index = items.iter().position(|item| item.id() == id)?;
    if index + 1 >= items.len() {
        return None;
    }
    move_item(items, index, index + 1).ok()
}

/// Checks that `pairs` names every item of `items` exactly once and that the
/// requested orders are dense.
pub fn validate_reorder<E: OrderedEntity>(items: &[E], pairs: &[OrderPair]) -> Result<()> {
    if pairs.len() != items.len() {
        return Err(Error::InvalidOrdering(format!(
            "expected {} pairs, got {}",
            items.len(),
            pairs.len()
        )));
    }

    let known: HashSet<&EntityId> = items.iter().map(OrderedEntity::id).collect();
    let mut named = HashSet::with_capacity(pairs.len());
    for pair in pairs {
        if !known.contains(&pair.id) {
            return Err(Error::InvalidOrdering(format!("unknown id {}", pair.id)));
        }
        if !named.insert(&pair.id) {
            return Err(Error::InvalidOrdering(format!("duplicate id {}", pair.id)));
        }
    }

    if !is_dense(pairs.iter().map(|p| p.order)) {
        return Err(Error::InvalidOrdering(
            "orders must be exactly 0..n with no gaps".to_string(),
        ));
    }
    Ok(())
}
