use curator_sync::{ErrorKind, Notice, OperationKind, Severity, StatusBoard, MutationStatus, SyncError};
use curator_types::{CollectionKey, FieldErrors};
use pretty_assertions::assert_eq;

fn key() -> CollectionKey {
    CollectionKey::new("testimonials")
}

// ── Status mapping ──────────────────────────────────────────────

#[test]
fn rejection_body_becomes_validation() {
    let err = SyncError::from_status(
        422,
        r#"{"message":"Rating out of range","errors":{"rating":["must be 1-5"]}}"#,
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "validation failed: Rating out of range");
    assert_eq!(err.field_errors().unwrap().get("rating").unwrap(), ["must be 1-5"]);
}

#[test]
fn plain_rejection_body_is_the_message() {
    let err = SyncError::from_status(400, "bad payload");
    assert_eq!(err.to_string(), "validation failed: bad payload");
    assert!(err.field_errors().is_none());

    let err = SyncError::from_status(422, "");
    assert_eq!(err.to_string(), "validation failed: rejected with status 422");
}

#[test]
fn empty_field_map_is_dropped() {
    let err = SyncError::from_status(422, r#"{"message":"nope","errors":{}}"#);
    assert!(err.field_errors().is_none());
}

#[test]
fn conflict_statuses() {
    for status in [404, 409, 412] {
        assert_eq!(SyncError::from_status(status, "").kind(), ErrorKind::Conflict);
    }
}

#[test]
fn everything_else_is_transport() {
    for status in [401, 403, 429, 500, 502, 503] {
        assert_eq!(SyncError::from_status(status, "").kind(), ErrorKind::Transport);
    }
}

#[test]
fn internal_errors_never_come_from_the_remote() {
    assert_eq!(SyncError::CacheType(key()).kind(), ErrorKind::Internal);
    assert_eq!(SyncError::NotLoaded(key()).kind(), ErrorKind::Conflict);
}

#[test]
fn protected_field_becomes_validation() {
    let err: SyncError = curator_types::Error::ProtectedField("order".into()).into();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ── Notice wording ──────────────────────────────────────────────

#[test]
fn validation_notice_quotes_the_message() {
    let mut fields = FieldErrors::new();
    fields.add("quote", "is required");
    let err = SyncError::Validation {
        message: "Quote is required".into(),
        fields: Some(fields.clone()),
    };

    let notice = Notice::failure(OperationKind::Create, &key(), &err);
    assert_eq!(notice.severity, Severity::Error);
    assert_eq!(notice.message, "Could not save testimonials: Quote is required");
    assert_eq!(notice.fields, Some(fields));
}

#[test]
fn transport_notice_names_the_action() {
    let notice = Notice::failure(
        OperationKind::Reorder,
        &key(),
        &SyncError::Transport("timeout".into()),
    );
    assert!(notice.message.starts_with("Network problem while reordering testimonials."));
    assert!(notice.message.contains("undone"));
}

#[test]
fn conflict_notice_asks_for_refresh() {
    let notice = Notice::failure(
        OperationKind::Delete,
        &key(),
        &SyncError::Conflict("gone".into()),
    );
    assert!(notice.message.contains("changed elsewhere"));
    assert!(notice.message.contains("refresh"));
}

#[test]
fn success_notices_are_informational() {
    for kind in OperationKind::ALL {
        let notice = Notice::success(kind, &key());
        assert_eq!(notice.severity, Severity::Info);
        assert!(notice.message.contains("testimonials"));
    }
}

// ── Status board ────────────────────────────────────────────────

#[test]
fn status_starts_idle_for_every_kind() {
    let board = StatusBoard::new();
    for kind in OperationKind::ALL {
        assert_eq!(board.status(kind), MutationStatus::Idle);
    }
    assert!(!board.is_busy());
}

#[test]
fn operation_kinds_serialize_snake_case() {
    assert_eq!(
        serde_json::to_string(&OperationKind::ToggleActive).unwrap(),
        "\"toggle_active\""
    );
    assert_eq!(OperationKind::Reorder.to_string(), "reorder");
}
