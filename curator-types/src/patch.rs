//! Partial-field updates.
//!
//! A [`FieldPatch`] maps wire field names to new JSON values. It is applied by
//! merging its keys into the entity's serialized form and deserializing the
//! result back into the entity type, so a patch that does not fit the type
//! is rejected before anything leaves the process.

use crate::{Error, OrderedEntity, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields a patch may never carry. Ids are immutable and `order` only
/// changes through a reorder.
const PROTECTED_FIELDS: [&str; 2] = ["id", "order"];

/// A set of top-level field assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPatch(Map<String, Value>);

impl FieldPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a patch assigning a single field.
    #[must_use]
    pub fn single(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().with(field, value)
    }

    /// Builder-style assignment.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Assigns `field`, replacing any earlier value in this patch.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the value assigned to `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Names of the fields this patch touches.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps only the fields for which `keep` returns true.
    #[must_use]
    pub fn retain(mut self, mut keep: impl FnMut(&str) -> bool) -> Self {
        self.0.retain(|field, _| keep(field));
        self
    }

    /// Rejects patches that touch `id` or `order`.
    pub fn check_protected(&self) -> Result<()> {
        match PROTECTED_FIELDS.iter().find(|f| self.0.contains_key(**f)) {
            Some(field) => Err(Error::ProtectedField((*field).to_string())),
            None => Ok(()),
        }
    }

    /// Returns a copy of `entity` with this patch merged in.
    pub fn apply<E: OrderedEntity>(&self, entity: &E) -> Result<E> {
        self.check_protected()?;
        let mut value = serde_json::to_value(entity)?;
        let object = value.as_object_mut().ok_or(Error::NotAnObject)?;
        for (field, v) in &self.0 {
            object.insert(field.clone(), v.clone());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Captures the values `entity` currently holds for every field of this
    /// patch. Applying the result undoes this patch on those fields only.
    /// Fields absent from the serialized entity are captured as `null`.
    pub fn inverse<E: OrderedEntity>(&self, entity: &E) -> Result<FieldPatch> {
        let value = serde_json::to_value(entity)?;
        let object = value.as_object().ok_or(Error::NotAnObject)?;
        let prior = self
            .0
            .keys()
            .map(|field| {
                let v = object.get(field).cloned().unwrap_or(Value::Null);
                (field.clone(), v)
            })
            .collect();
        Ok(Self(prior))
    }

    /// Consumes the patch, returning the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for FieldPatch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for FieldPatch {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
