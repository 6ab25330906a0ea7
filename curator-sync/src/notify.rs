//! User-facing notifications.
//!
//! The engine never renders anything; it hands [`Notice`]s to a [`Notifier`]
//! supplied by the host (a toast layer, a log, a test recorder).

use crate::error::{ErrorKind, SyncError};
use crate::pending::OperationKind;
use curator_types::{CollectionKey, FieldErrors};
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A message for the user about the outcome of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub kind: OperationKind,
    pub collection: CollectionKey,
    pub message: String,
    /// Field-level detail for validation failures.
    pub fields: Option<FieldErrors>,
}

impl Notice {
    /// Success notice, emitted only when enabled in the config.
    pub fn success(kind: OperationKind, collection: &CollectionKey) -> Self {
        let message = match kind {
            OperationKind::Create => format!("Created item in {collection}"),
            OperationKind::Update => format!("Saved changes to {collection}"),
            OperationKind::ToggleActive => format!("Updated visibility in {collection}"),
            OperationKind::Delete => format!("Deleted item from {collection}"),
            OperationKind::Reorder => format!("Saved new order of {collection}"),
        };
        Self {
            severity: Severity::Info,
            kind,
            collection: collection.clone(),
            message,
            fields: None,
        }
    }

    /// Failure notice with wording chosen by error kind.
    pub fn failure(kind: OperationKind, collection: &CollectionKey, err: &SyncError) -> Self {
        let message = match err.kind() {
            ErrorKind::Validation => match err {
                SyncError::Validation { message, .. } => {
                    format!("Could not save {collection}: {message}")
                }
                _ => format!("Could not save {collection}"),
            },
            ErrorKind::Transport => format!(
                "Network problem while {} {collection}. Your change was undone; please try again.",
                kind.verb()
            ),
            ErrorKind::Conflict => format!(
                "{collection} changed elsewhere. Your change was undone; refresh and try again."
            ),
            ErrorKind::Internal => format!("Unexpected error while {} {collection}: {err}", kind.verb()),
        };
        Self {
            severity: Severity::Error,
            kind,
            collection: collection.clone(),
            message,
            fields: err.field_errors().cloned(),
        }
    }
}

/// Receives notices from the engine.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Default notifier: writes notices to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.severity {
            Severity::Info => info!("[{}] {}", notice.collection, notice.message),
            Severity::Error => warn!("[{}] {}", notice.collection, notice.message),
        }
    }
}

/// Keeps every notice in memory, for hosts that poll instead of subscribing.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains recorded notices.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}
