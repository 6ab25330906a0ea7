use crate::EntityId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The shape every managed collection conforms to.
///
/// An ordered entity has a stable id, a dense zero-based `order` within its
/// collection, and a visibility flag. Everything else is payload that the
/// synchronization engine treats as opaque, apart from equality checks and
/// field patches applied through the entity's serialized form.
pub trait OrderedEntity:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Default cache key and endpoint segment of the collection.
    const COLLECTION: &'static str;

    /// Wire name of the visibility flag (`isActive`, or `isPublished` for
    /// collections that call it that).
    const ACTIVE_FIELD: &'static str = "isActive";

    fn id(&self) -> &EntityId;

    fn set_id(&mut self, id: EntityId);

    fn order(&self) -> u32;

    fn set_order(&mut self, order: u32);

    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// Equality of every field except `order`.
    fn content_eq(&self, other: &Self) -> bool {
        if self.order() == other.order() {
            return self == other;
        }
        let mut aligned = other.clone();
        aligned.set_order(self.order());
        *self == aligned
    }
}
