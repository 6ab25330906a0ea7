//! Per-operation mutation status for one collection.

use crate::notify::Notice;
use crate::pending::OperationKind;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Status of one operation kind, as shown by a view (spinners, error badges).
#[derive(Debug, Clone, PartialEq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error(Notice),
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[derive(Debug, Default)]
struct Slot {
    in_flight: usize,
    last: Option<MutationStatus>,
}

/// Tracks in-flight counts and last outcomes per [`OperationKind`].
///
/// A kind reports `Pending` while any of its operations is in flight, and
/// otherwise the outcome of the most recently settled one.
#[derive(Debug, Default)]
pub struct StatusBoard {
    slots: Mutex<HashMap<OperationKind, Slot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, kind: OperationKind) -> MutationStatus {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get(&kind) {
            Some(slot) if slot.in_flight > 0 => MutationStatus::Pending,
            Some(Slot { last: Some(last), .. }) => last.clone(),
            _ => MutationStatus::Idle,
        }
    }

    /// True if any operation kind is in flight.
    pub fn is_busy(&self) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().any(|slot| slot.in_flight > 0)
    }

    pub(crate) fn begin(&self, kind: OperationKind) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(kind).or_default().in_flight += 1;
    }

    pub(crate) fn succeed(&self, kind: OperationKind) {
        self.finish(kind, MutationStatus::Success);
    }

    pub(crate) fn fail(&self, kind: OperationKind, notice: Notice) {
        self.finish(kind, MutationStatus::Error(notice));
    }

    /// Clears a kind's last outcome, e.g. after the user dismissed an error.
    pub fn reset(&self, kind: OperationKind) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get_mut(&kind) {
            slot.last = None;
        }
    }

    fn finish(&self, kind: OperationKind, outcome: MutationStatus) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(kind).or_default();
        slot.in_flight = slot.in_flight.saturating_sub(1);
        slot.last = Some(outcome);
    }
}
