//! Drift detection between the cache and the remote store.

use curator_types::{EntityId, OrderedEntity};
use std::collections::HashMap;

/// Difference between a cached collection and a fresh remote listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    /// Present locally, missing remotely.
    pub local_only: Vec<EntityId>,
    /// Present remotely, missing locally.
    pub remote_only: Vec<EntityId>,
    /// Present on both sides with different payload fields.
    pub changed: Vec<EntityId>,
    /// Present on both sides with a different order.
    pub reordered: Vec<EntityId>,
    /// Whether the remote listing replaced the cache.
    pub applied: bool,
}

impl DriftReport {
    /// Compares `local` against `remote`. Ids are reported in the order they
    /// appear in their own list.
    pub fn between<E: OrderedEntity>(local: &[E], remote: &[E]) -> Self {
        let remote_by_id: HashMap<&EntityId, &E> =
            remote.iter().map(|item| (item.id(), item)).collect();
        let local_by_id: HashMap<&EntityId, &E> =
            local.iter().map(|item| (item.id(), item)).collect();

        let mut report = Self::default();
        for item in local {
            match remote_by_id.get(item.id()) {
                None => report.local_only.push(item.id().clone()),
                Some(theirs) => {
                    if !item.content_eq(theirs) {
                        report.changed.push(item.id().clone());
                    }
                    if item.order() != theirs.order() {
                        report.reordered.push(item.id().clone());
                    }
                }
            }
        }
        report.remote_only = remote
            .iter()
            .filter(|item| !local_by_id.contains_key(item.id()))
            .map(|item| item.id().clone())
            .collect();
        report
    }

    /// True if both sides agree.
    pub fn is_clean(&self) -> bool {
        self.local_only.is_empty()
            && self.remote_only.is_empty()
            && self.changed.is_empty()
            && self.reordered.is_empty()
    }
}
