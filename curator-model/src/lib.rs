//! Admin-panel entity model for Curator.
//!
//! Defines the concrete collections the content panel manages:
//! - [`Testimonial`], [`Faq`], [`Service`], [`Article`], [`FooterBadge`], [`CustomCode`]
//! - [`CollectionSchema`]: describes a kind's key, endpoint, visibility flag and fields
//! - [`Validate`]: edge validation applied by forms before data reaches the engine
//!
//! The synchronization engine is generic over [`curator_types::OrderedEntity`]
//! and never inspects these payloads; schemas and validation live here, at
//! the edge.

mod entity;
mod schema;
mod validate;

pub use entity::{Article, CodePlacement, CustomCode, Faq, FooterBadge, Service, Testimonial};
pub use schema::{all_schemas, schema_for, CollectionSchema, FieldSpec, FieldType};
pub use validate::Validate;
