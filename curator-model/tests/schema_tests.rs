use curator_model::{all_schemas, schema_for, CollectionSchema, FieldSpec, FieldType, Testimonial};

// ── FieldSpec constructors ───────────────────────────────────────

#[test]
fn text_field() {
    let f = FieldSpec::text("title", true);
    assert_eq!(f.name, "title");
    assert_eq!(f.field_type, FieldType::Text);
    assert!(f.required);
}

#[test]
fn tags_are_optional() {
    let f = FieldSpec::tags("tags");
    assert_eq!(f.field_type, FieldType::Tags);
    assert!(!f.required);
}

#[test]
fn enumeration_carries_options() {
    let f = FieldSpec::enumeration("placement", &["head", "bodyEnd"]);
    assert_eq!(f.field_type, FieldType::Enum);
    assert_eq!(f.enum_options.as_deref(), Some(&["head".to_string(), "bodyEnd".to_string()][..]));
}

// ── CollectionSchema ─────────────────────────────────────────────

#[test]
fn schema_of_kind_uses_descriptors() {
    let schema = CollectionSchema::of::<Testimonial>(vec![]);
    assert_eq!(schema.collection, "testimonials");
    assert_eq!(schema.endpoint, "/testimonials");
    assert_eq!(schema.active_field, "isActive");
}

#[test]
fn all_six_collections_present() {
    let keys: Vec<String> = all_schemas().into_iter().map(|s| s.collection).collect();
    assert_eq!(
        keys,
        vec!["testimonials", "articles", "faqs", "services", "footer-badges", "custom-codes"]
    );
}

#[test]
fn schema_for_article() {
    let schema = schema_for("articles").unwrap();
    assert_eq!(schema.active_field, "isPublished");
    assert_eq!(schema.required_fields(), vec!["title", "slug"]);
    assert!(schema.field("tags").is_some());
}

#[test]
fn schema_for_unknown_is_none() {
    assert!(schema_for("pricing").is_none());
}

#[test]
fn schemas_never_list_engine_fields() {
    for schema in all_schemas() {
        for engine_field in ["id", "order", "isActive", "isPublished"] {
            assert!(
                schema.field(engine_field).is_none(),
                "{} lists {engine_field}",
                schema.collection
            );
        }
    }
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn field_type_serde_uses_snake_case() {
    let json = serde_json::to_string(&FieldType::LongText).unwrap();
    assert_eq!(json, "\"long_text\"");
}

#[test]
fn field_spec_omits_absent_options() {
    let json = serde_json::to_value(FieldSpec::text("title", true)).unwrap();
    assert!(json.get("enum_options").is_none());
}

#[test]
fn schema_serde_roundtrip() {
    let original = schema_for("custom-codes").unwrap();
    let json = serde_json::to_string(&original).unwrap();
    let parsed: CollectionSchema = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, original);
}
