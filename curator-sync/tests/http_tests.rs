mod common;

use common::*;
use curator_sync::{
    AdminSession, ErrorKind, HttpStore, HttpStoreConfig, RecordingNotifier, RemoteCollection,
    SyncConfig, SyncError,
};
use curator_types::{FieldPatch, OrderPair};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> HttpStore {
    HttpStore::new(HttpStoreConfig {
        base_url: format!("{}/api", server.uri()),
        ..HttpStoreConfig::default()
    })
    .unwrap()
}

async fn mount_list(server: &MockServer, items: Vec<Row>) {
    Mock::given(method("GET"))
        .and(path("/api/rows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(server)
        .await;
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let config = HttpStoreConfig::default();
    assert_eq!(config.base_url, "http://127.0.0.1:4010/api");
    assert_eq!(config.timeout_secs, 30);
    assert!(config.user_agent.starts_with("curator/"));
}

#[test]
fn collection_endpoints_follow_the_collection_name() {
    let store = HttpStore::new(HttpStoreConfig {
        base_url: "https://site.example/api/".into(),
        ..HttpStoreConfig::default()
    })
    .unwrap();
    assert_eq!(store.collection::<Row>().endpoint(), "/rows");
    assert_eq!(store.collection_at::<Row>("/v2/lines").endpoint(), "/v2/lines");
}

// ── Requests ────────────────────────────────────────────────────

#[tokio::test]
async fn list_parses_entities() {
    let server = MockServer::start().await;
    mount_list(&server, rows(&["a", "b"])).await;

    let items = store_for(&server).collection::<Row>().list().await.unwrap();
    assert_eq!(items, rows(&["a", "b"]));
}

#[tokio::test]
async fn create_posts_payload_without_server_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rows"))
        .and(body_json(json!({ "isActive": true, "title": "title x" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(row("srv-1", 2)))
        .expect(1)
        .mount(&server)
        .await;

    let created = store_for(&server)
        .collection::<Row>()
        .create(&row("x", 9))
        .await
        .unwrap();
    assert_eq!(created.id, id("srv-1"));
    assert_eq!(created.order, 2);
}

#[tokio::test]
async fn update_sends_only_patched_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/rows/a"))
        .and(body_json(json!({ "isActive": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(Row {
            is_active: false,
            ..row("a", 0)
        }))
        .expect(1)
        .mount(&server)
        .await;

    let stored = store_for(&server)
        .collection::<Row>()
        .update(&id("a"), &FieldPatch::single("isActive", false))
        .await
        .unwrap();
    assert!(!stored.unwrap().is_active);
}

#[tokio::test]
async fn update_without_entity_body_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/rows/a"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/rows/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let rows = store_for(&server).collection::<Row>();
    let patch = FieldPatch::single("title", "new");
    assert_eq!(rows.update(&id("a"), &patch).await.unwrap(), None);
    assert_eq!(rows.update(&id("b"), &patch).await.unwrap(), None);
}

#[tokio::test]
async fn delete_and_reorder_hit_their_routes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/rows/a"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/rows/reorder"))
        .and(body_json(json!([
            { "id": "b", "order": 0 },
            { "id": "c", "order": 1 }
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = store_for(&server).collection::<Row>();
    rows.delete(&id("a")).await.unwrap();
    rows.reorder(&[OrderPair::new("b", 0), OrderPair::new("c", 1)])
        .await
        .unwrap();
}

// ── Status mapping ──────────────────────────────────────────────

#[tokio::test]
async fn unprocessable_maps_to_validation_with_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rows"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Title is required",
            "errors": { "title": ["must not be empty"] }
        })))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .collection::<Row>()
        .create(&row("x", 0))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "validation failed: Title is required");
    assert_eq!(
        err.field_errors().unwrap().get("title"),
        Some(&["must not be empty".to_string()][..])
    );
}

#[tokio::test]
async fn not_found_maps_to_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/rows/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such row"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .collection::<Row>()
        .delete(&id("gone"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn server_error_maps_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rows"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = store_for(&server).collection::<Row>().list().await.unwrap_err();
    assert!(matches!(err, SyncError::Transport(ref m) if m.contains("503")));
}

#[tokio::test]
async fn malformed_list_body_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rows"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = store_for(&server).collection::<Row>().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let store = HttpStore::new(HttpStoreConfig {
        base_url: format!("http://127.0.0.1:{port}/api"),
        ..HttpStoreConfig::default()
    })
    .unwrap();
    let err = store.collection::<Row>().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

// ── Through a session ───────────────────────────────────────────

#[tokio::test]
async fn rejected_update_rolls_back_and_reports_fields() {
    let server = MockServer::start().await;
    mount_list(&server, rows(&["a", "b"])).await;
    Mock::given(method("PATCH"))
        .and(path("/api/rows/a"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Title too long",
            "errors": { "title": ["at most 80 characters"] }
        })))
        .mount(&server)
        .await;

    let notices = Arc::new(RecordingNotifier::new());
    let session = AdminSession::with_notifier(SyncConfig::default(), notices.clone());
    let handle = session.http_collection::<Row>(&store_for(&server));
    handle.ensure_loaded().await.unwrap();

    let err = handle
        .update(&id("a"), FieldPatch::single("title", "x".repeat(200)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(handle.snapshot().await.unwrap(), rows(&["a", "b"]));
    let notices = notices.take();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Could not save rows: Title too long");
    assert!(notices[0].fields.as_ref().unwrap().get("title").is_some());
}

#[tokio::test]
async fn created_row_takes_the_server_identity() {
    let server = MockServer::start().await;
    mount_list(&server, rows(&["a"])).await;
    Mock::given(method("POST"))
        .and(path("/api/rows"))
        .respond_with(ResponseTemplate::new(201).set_body_json(Row {
            title: "fresh".into(),
            ..row("srv-9", 1)
        }))
        .mount(&server)
        .await;

    let session = AdminSession::new(SyncConfig::default());
    let handle = session.http_collection::<Row>(&store_for(&server));
    handle.ensure_loaded().await.unwrap();

    let created = handle
        .create(Row {
            title: "fresh".into(),
            ..row("draft", 0)
        })
        .await
        .unwrap();

    assert_eq!(created.id, id("srv-9"));
    assert_eq!(ids(&handle.snapshot().await.unwrap()), vec!["a", "srv-9"]);
}
