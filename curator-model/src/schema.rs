use crate::{Article, CustomCode, Faq, FooterBadge, Service, Testimonial};
use curator_types::OrderedEntity;
use serde::{Deserialize, Serialize};

/// Describes a collection for tooling: where it lives, what its visibility
/// flag is called, and which payload fields a form edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Cache key of the collection.
    pub collection: String,
    /// Remote endpoint path, relative to the store's base URL.
    pub endpoint: String,
    /// Wire name of the visibility flag.
    pub active_field: String,
    pub fields: Vec<FieldSpec>,
}

impl CollectionSchema {
    /// Builds the schema of entity kind `E` with the given payload fields.
    pub fn of<E: OrderedEntity>(fields: Vec<FieldSpec>) -> Self {
        Self {
            collection: E::COLLECTION.to_string(),
            endpoint: format!("/{}", E::COLLECTION),
            active_field: E::ACTIVE_FIELD.to_string(),
            fields,
        }
    }

    /// Looks up a payload field by wire name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Wire names of the fields a form must fill in.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// One editable payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Wire (camelCase) field name.
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    /// Allowed values. Only meaningful when the type is `Enum`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_options: Option<Vec<String>>,
}

impl FieldSpec {
    fn simple(name: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
            enum_options: None,
        }
    }

    /// Single-line text.
    pub fn text(name: &str, required: bool) -> Self {
        Self::simple(name, FieldType::Text, required)
    }

    /// Multi-line or rich text.
    pub fn long_text(name: &str, required: bool) -> Self {
        Self::simple(name, FieldType::LongText, required)
    }

    /// Media or link reference.
    pub fn url(name: &str, required: bool) -> Self {
        Self::simple(name, FieldType::Url, required)
    }

    pub fn number(name: &str) -> Self {
        Self::simple(name, FieldType::Number, true)
    }

    /// List of short strings.
    pub fn tags(name: &str) -> Self {
        Self::simple(name, FieldType::Tags, false)
    }

    /// Raw markup injected into the page.
    pub fn code(name: &str) -> Self {
        Self::simple(name, FieldType::Code, true)
    }

    pub fn enumeration(name: &str, options: &[&str]) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Enum,
            required: true,
            enum_options: Some(options.iter().map(|o| (*o).to_string()).collect()),
        }
    }
}

/// The input type of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    LongText,
    Url,
    Number,
    Tags,
    Enum,
    Code,
}

/// Schemas of every collection the panel manages, in sidebar order.
pub fn all_schemas() -> Vec<CollectionSchema> {
    vec![
        CollectionSchema::of::<Testimonial>(vec![
            FieldSpec::text("authorName", true),
            FieldSpec::text("authorRole", false),
            FieldSpec::text("company", false),
            FieldSpec::long_text("quote", true),
            FieldSpec::number("rating"),
            FieldSpec::url("avatarUrl", false),
        ]),
        CollectionSchema::of::<Article>(vec![
            FieldSpec::text("title", true),
            FieldSpec::text("slug", true),
            FieldSpec::long_text("excerpt", false),
            FieldSpec::long_text("body", false),
            FieldSpec::url("coverImage", false),
            FieldSpec::tags("tags"),
        ]),
        CollectionSchema::of::<Faq>(vec![
            FieldSpec::text("question", true),
            FieldSpec::long_text("answer", true),
            FieldSpec::text("category", false),
        ]),
        CollectionSchema::of::<Service>(vec![
            FieldSpec::text("title", true),
            FieldSpec::text("slug", true),
            FieldSpec::long_text("description", false),
            FieldSpec::text("icon", false),
            FieldSpec::tags("features"),
        ]),
        CollectionSchema::of::<FooterBadge>(vec![
            FieldSpec::text("label", true),
            FieldSpec::url("imageUrl", true),
            FieldSpec::url("linkUrl", false),
        ]),
        CollectionSchema::of::<CustomCode>(vec![
            FieldSpec::text("name", true),
            FieldSpec::enumeration("placement", &["head", "bodyStart", "bodyEnd"]),
            FieldSpec::code("snippet"),
        ]),
    ]
}

/// Looks up a schema by collection key.
pub fn schema_for(collection: &str) -> Option<CollectionSchema> {
    all_schemas().into_iter().find(|s| s.collection == collection)
}
