use curator_devstore::{build_router, DevStore, OrderEntry};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Spin up the HTTP server on an OS-assigned port, returning the API base URL.
async fn spawn_test_server(store: DevStore) -> String {
    let app = build_router(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}/api", port)
}

fn seeded() -> DevStore {
    DevStore::from_seed(json!({
        "faqs": [
            { "id": "a", "order": 0, "isActive": true, "question": "A?" },
            { "id": "b", "order": 1, "isActive": true, "question": "B?" },
            { "id": "c", "order": 2, "isActive": false, "question": "C?" }
        ]
    }))
    .unwrap()
}

async fn list(base: &str, collection: &str) -> Vec<Value> {
    reqwest::get(format!("{}/{}", base, collection))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn ids(records: &[Value]) -> Vec<&str> {
    records.iter().map(|r| r["id"].as_str().unwrap()).collect()
}

// ── Seeding ─────────────────────────────────────────────────────

#[tokio::test]
async fn seed_fills_missing_ids_and_orders() {
    let store = DevStore::from_seed(json!({
        "services": [ { "title": "one" }, { "title": "two" } ]
    }))
    .unwrap();

    let records = store.records("services").await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["order"], json!(0));
    assert_eq!(records[1]["order"], json!(1));
    assert!(records.iter().all(|r| r["id"].is_string()));
}

#[test]
fn seed_rejects_non_object() {
    assert!(DevStore::from_seed(json!([1, 2])).is_err());
    assert!(DevStore::from_seed(json!({ "faqs": "nope" })).is_err());
}

// ── Read / create ───────────────────────────────────────────────

#[tokio::test]
async fn list_returns_records_sorted_by_order() {
    let base = spawn_test_server(seeded()).await;
    let records = list(&base, "faqs").await;
    assert_eq!(ids(&records), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn unknown_collection_lists_empty() {
    let base = spawn_test_server(DevStore::new()).await;
    assert!(list(&base, "articles").await.is_empty());
}

#[tokio::test]
async fn create_assigns_id_and_appends() {
    let base = spawn_test_server(seeded()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/faqs", base))
        .json(&json!({ "id": "ignored", "order": 99, "question": "D?", "isActive": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let created: Value = resp.json().await.unwrap();
    assert_ne!(created["id"], json!("ignored"));
    assert_eq!(created["order"], json!(3));
    assert_eq!(created["question"], json!("D?"));
    assert_eq!(list(&base, "faqs").await.len(), 4);
}

#[tokio::test]
async fn create_rejects_non_object() {
    let base = spawn_test_server(DevStore::new()).await;
    let resp = reqwest::Client::new()
        .post(format!("{}/faqs", base))
        .json(&json!([1]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

// ── Patch / replace / delete ────────────────────────────────────

#[tokio::test]
async fn patch_merges_fields() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .patch(format!("{}/faqs/c", base))
        .json(&json!({ "isActive": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let record: Value = resp.json().await.unwrap();
    assert_eq!(record["isActive"], json!(true));
    assert_eq!(record["question"], json!("C?"));
}

#[tokio::test]
async fn patch_of_order_is_rejected_with_field_errors() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .patch(format!("{}/faqs/a", base))
        .json(&json!({ "order": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"]["order"], json!(["is managed by the store"]));
}

#[tokio::test]
async fn patch_unknown_id_is_404() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .patch(format!("{}/faqs/zzz", base))
        .json(&json!({ "question": "?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn put_replaces_payload_but_keeps_id_and_order() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .put(format!("{}/faqs/b", base))
        .json(&json!({ "id": "x", "order": 7, "question": "New B?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let record: Value = resp.json().await.unwrap();
    assert_eq!(record, json!({ "id": "b", "order": 1, "question": "New B?" }));
}

#[tokio::test]
async fn delete_leaves_order_gaps() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .delete(format!("{}/faqs/b", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let records = list(&base, "faqs").await;
    assert_eq!(ids(&records), vec!["a", "c"]);
    assert_eq!(records[1]["order"], json!(2));
}

#[tokio::test]
async fn delete_unknown_is_404() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .delete(format!("{}/faqs/nope", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

// ── Reorder ─────────────────────────────────────────────────────

fn entries(pairs: &[(&str, u32)]) -> Vec<OrderEntry> {
    pairs
        .iter()
        .map(|(id, order)| OrderEntry {
            id: (*id).to_string(),
            order: *order,
        })
        .collect()
}

#[tokio::test]
async fn reorder_rewrites_all_orders() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .put(format!("{}/faqs/reorder", base))
        .json(&entries(&[("c", 0), ("a", 1), ("b", 2)]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let returned: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(ids(&returned), vec!["c", "a", "b"]);
    assert_eq!(ids(&list(&base, "faqs").await), vec!["c", "a", "b"]);
}

#[tokio::test]
async fn incomplete_reorder_is_422() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .put(format!("{}/faqs/reorder", base))
        .json(&entries(&[("a", 0), ("b", 1)]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    assert_eq!(ids(&list(&base, "faqs").await), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn reorder_with_gaps_is_422() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .put(format!("{}/faqs/reorder", base))
        .json(&entries(&[("a", 0), ("b", 1), ("c", 5)]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn reorder_with_unknown_id_is_404() {
    let base = spawn_test_server(seeded()).await;
    let resp = reqwest::Client::new()
        .put(format!("{}/faqs/reorder", base))
        .json(&entries(&[("a", 0), ("b", 1), ("zzz", 2)]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let base = spawn_test_server(DevStore::new()).await;
    let resp = reqwest::get(format!("{}/faqs/a/b/c", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
}
