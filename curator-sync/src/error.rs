//! Error types for the sync layer.

use curator_types::{CollectionKey, FieldErrors};
use serde::Deserialize;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The payload was rejected, locally or by the remote store.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        fields: Option<FieldErrors>,
    },

    /// Network failure, timeout, or an unexpected remote status.
    #[error("transport error: {0}")]
    Transport(String),

    /// Remote state diverged from what the optimistic write assumed.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A mutation targeted a collection that was never loaded.
    #[error("collection {0} is not loaded")]
    NotLoaded(CollectionKey),

    /// A cache key was reused with a different entity type.
    #[error("collection {0} holds a different entity type")]
    CacheType(CollectionKey),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// User-facing classification of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Conflict,
    /// Programming errors that never come from the remote store.
    Internal,
}

/// Body shape of a remote 400/422 response.
#[derive(Debug, Deserialize)]
struct RejectionBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<FieldErrors>,
}

impl SyncError {
    /// Local validation failure without field detail.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Conflict(_) | Self::NotLoaded(_) => ErrorKind::Conflict,
            Self::CacheType(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Field-level detail, when the rejection carried any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { fields, .. } => fields.as_ref(),
            _ => None,
        }
    }

    /// Maps a non-success HTTP status and its body onto the taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 | 422 => match serde_json::from_str::<RejectionBody>(body) {
                Ok(rejection) => Self::Validation {
                    message: rejection
                        .message
                        .unwrap_or_else(|| format!("rejected with status {status}")),
                    fields: rejection.errors.filter(|e| !e.is_empty()),
                },
                Err(_) => Self::Validation {
                    message: if body.is_empty() {
                        format!("rejected with status {status}")
                    } else {
                        body.to_string()
                    },
                    fields: None,
                },
            },
            404 | 409 | 412 => Self::Conflict(format!("remote returned {status}: {body}")),
            _ => Self::Transport(format!("remote returned {status}: {body}")),
        }
    }
}

impl From<curator_types::Error> for SyncError {
    fn from(err: curator_types::Error) -> Self {
        match err {
            curator_types::Error::Serialization(e) => Self::Validation {
                message: format!("payload does not fit the entity: {e}"),
                fields: None,
            },
            other => Self::validation(other.to_string()),
        }
    }
}
