use curator_types::{EntityId, OrderedEntity};
use serde::{Deserialize, Serialize};

/// Implements [`OrderedEntity`] for a kind with `id`, `order` and a boolean
/// visibility field.
macro_rules! ordered_entity {
    ($ty:ty, $collection:literal, $flag:ident, $wire:literal) => {
        impl OrderedEntity for $ty {
            const COLLECTION: &'static str = $collection;
            const ACTIVE_FIELD: &'static str = $wire;

            fn id(&self) -> &EntityId {
                &self.id
            }

            fn set_id(&mut self, id: EntityId) {
                self.id = id;
            }

            fn order(&self) -> u32 {
                self.order
            }

            fn set_order(&mut self, order: u32) {
                self.order = order;
            }

            fn is_active(&self) -> bool {
                self.$flag
            }

            fn set_active(&mut self, active: bool) {
                self.$flag = active;
            }
        }
    };
}

/// A customer quote shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: EntityId,
    pub order: u32,
    pub is_active: bool,
    pub author_name: String,
    #[serde(default)]
    pub author_role: String,
    #[serde(default)]
    pub company: String,
    pub quote: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Testimonial {
    /// Creates an active draft. The coordinator assigns id and order on create.
    pub fn new(author_name: impl Into<String>, quote: impl Into<String>, rating: u8) -> Self {
        Self {
            id: EntityId::placeholder(),
            order: 0,
            is_active: true,
            author_name: author_name.into(),
            author_role: String::new(),
            company: String::new(),
            quote: quote.into(),
            rating,
            avatar_url: None,
        }
    }
}

ordered_entity!(Testimonial, "testimonials", is_active, "isActive");

/// A question/answer pair in the FAQ section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: EntityId,
    pub order: u32,
    pub is_active: bool,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Faq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: EntityId::placeholder(),
            order: 0,
            is_active: true,
            question: question.into(),
            answer: answer.into(),
            category: None,
        }
    }
}

ordered_entity!(Faq, "faqs", is_active, "isActive");

/// A service offering card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: EntityId,
    pub order: u32,
    pub is_active: bool,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Icon name from the panel's icon catalog.
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Service {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: EntityId::placeholder(),
            order: 0,
            is_active: true,
            title: title.into(),
            slug: slug.into(),
            description: String::new(),
            icon: String::new(),
            features: Vec::new(),
        }
    }
}

ordered_entity!(Service, "services", is_active, "isActive");

/// A blog article. Visibility is called "published" for this collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: EntityId,
    pub order: u32,
    pub is_published: bool,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Article {
    /// Creates an unpublished draft.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: EntityId::placeholder(),
            order: 0,
            is_published: false,
            title: title.into(),
            slug: slug.into(),
            excerpt: String::new(),
            body: String::new(),
            cover_image: None,
            tags: Vec::new(),
        }
    }
}

ordered_entity!(Article, "articles", is_published, "isPublished");

/// A trust badge in the site footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterBadge {
    pub id: EntityId,
    pub order: u32,
    pub is_active: bool,
    pub label: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

impl FooterBadge {
    pub fn new(label: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: EntityId::placeholder(),
            order: 0,
            is_active: true,
            label: label.into(),
            image_url: image_url.into(),
            link_url: None,
        }
    }
}

ordered_entity!(FooterBadge, "footer-badges", is_active, "isActive");

/// Where an injected snippet is placed in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CodePlacement {
    Head,
    BodyStart,
    BodyEnd,
}

/// An injected marketing snippet (analytics tags, pixels, chat widgets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCode {
    pub id: EntityId,
    pub order: u32,
    pub is_active: bool,
    pub name: String,
    pub placement: CodePlacement,
    pub snippet: String,
}

impl CustomCode {
    pub fn new(name: impl Into<String>, placement: CodePlacement, snippet: impl Into<String>) -> Self {
        Self {
            id: EntityId::placeholder(),
            order: 0,
            is_active: true,
            name: name.into(),
            placement,
            snippet: snippet.into(),
        }
    }
}

ordered_entity!(CustomCode, "custom-codes", is_active, "isActive");
