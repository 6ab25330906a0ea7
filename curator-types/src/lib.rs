//! Core type definitions for Curator.
//!
//! This crate defines the collection-agnostic types the synchronization
//! engine is built on:
//! - Entity identifiers and collection cache keys
//! - The [`OrderedEntity`] contract every managed collection conforms to
//! - Field patches used for partial updates
//! - Dense ordering helpers (`{id, order}` pairs, move/swap computations)
//! - Field-level validation errors shared by the model and the engine
//!
//! Concrete admin-panel kinds (testimonials, FAQs, articles, ...) live in
//! `curator-model`, not here.

mod entity;
mod ids;
mod ordering;
mod patch;
mod validation;

pub use entity::OrderedEntity;
pub use ids::{CollectionKey, EntityId};
pub use ordering::{
    is_dense, move_down, move_item, move_up, normalized_pairs, validate_reorder, OrderPair,
};
pub use patch::FieldPatch;
pub use validation::FieldErrors;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("patch may not modify `{0}`")]
    ProtectedField(String),

    #[error("invalid ordering: {0}")]
    InvalidOrdering(String),

    #[error("entity is not a JSON object")]
    NotAnObject,
}
