use crate::{Article, CustomCode, Faq, FooterBadge, Service, Testimonial};
use curator_types::FieldErrors;

/// Edge validation run by a form before it hands a payload to the engine.
///
/// Errors are keyed by wire field name so the form can mark the inputs.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Lowercase ASCII words separated by single hyphens.
fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Absolute http(s) URLs or site-relative paths.
fn is_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://") || value.starts_with('/')
}

fn optional_url(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        errors.require(is_url(v), field, "must be an http(s) URL or a site path");
    }
}

impl Validate for Testimonial {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require(not_blank(&self.author_name), "authorName", "is required");
        errors.require(not_blank(&self.quote), "quote", "is required");
        errors.require(
            (1..=5).contains(&self.rating),
            "rating",
            "must be between 1 and 5",
        );
        optional_url(&mut errors, "avatarUrl", self.avatar_url.as_deref());
        errors.into_result()
    }
}

impl Validate for Faq {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require(not_blank(&self.question), "question", "is required");
        errors.require(not_blank(&self.answer), "answer", "is required");
        errors.into_result()
    }
}

impl Validate for Service {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require(not_blank(&self.title), "title", "is required");
        errors.require(is_slug(&self.slug), "slug", "must be a lowercase-hyphenated slug");
        errors.require(
            self.features.iter().all(|f| not_blank(f)),
            "features",
            "must not contain empty entries",
        );
        errors.into_result()
    }
}

impl Validate for Article {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require(not_blank(&self.title), "title", "is required");
        errors.require(is_slug(&self.slug), "slug", "must be a lowercase-hyphenated slug");
        // Drafts may be empty; a published article needs a body.
        if self.is_published {
            errors.require(not_blank(&self.body), "body", "is required to publish");
        }
        optional_url(&mut errors, "coverImage", self.cover_image.as_deref());
        errors.into_result()
    }
}

impl Validate for FooterBadge {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require(not_blank(&self.label), "label", "is required");
        errors.require(is_url(&self.image_url), "imageUrl", "must be an http(s) URL or a site path");
        optional_url(&mut errors, "linkUrl", self.link_url.as_deref());
        errors.into_result()
    }
}

impl Validate for CustomCode {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require(not_blank(&self.name), "name", "is required");
        errors.require(not_blank(&self.snippet), "snippet", "is required");
        errors.into_result()
    }
}
