//! In-memory remote store and HTTP API for local Curator development.
//!
//! Stores arbitrary JSON records per collection under `/api/{collection}`:
//!
//! | Method | Path                          | Effect                              |
//! |--------|-------------------------------|-------------------------------------|
//! | GET    | `/api/{collection}`           | records sorted by `order`           |
//! | POST   | `/api/{collection}`           | create, assigns `id` and `order`    |
//! | PUT    | `/api/{collection}/reorder`   | rewrite every `order` at once       |
//! | PATCH  | `/api/{collection}/{id}`      | merge fields                        |
//! | PUT    | `/api/{collection}/{id}`      | replace payload, keep `id`/`order`  |
//! | DELETE | `/api/{collection}/{id}`      | remove, no renumbering              |

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// One stored record.
pub type Record = Map<String, Value>;

/// Fields the store owns; clients may not patch them.
const PROTECTED: [&str; 2] = ["id", "order"];

/// One entry of a reorder request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderEntry {
    pub id: String,
    pub order: u32,
}

/// Shared store state.
#[derive(Clone, Default)]
pub struct DevStore {
    collections: Arc<RwLock<HashMap<String, Vec<Record>>>>,
}

impl DevStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `{ "collection": [record, ...], ... }`.
    ///
    /// Records without an `id` get one; records without an `order` get their
    /// array index.
    pub fn from_seed(seed: Value) -> Result<Self, String> {
        let Value::Object(seed) = seed else {
            return Err("seed must be a JSON object of collections".to_string());
        };
        let mut collections = HashMap::new();
        for (name, records) in seed {
            let Value::Array(records) = records else {
                return Err(format!("seed collection {name} must be an array"));
            };
            let mut stored = Vec::with_capacity(records.len());
            for (index, record) in records.into_iter().enumerate() {
                let Value::Object(mut record) = record else {
                    return Err(format!("seed record {index} of {name} must be an object"));
                };
                record
                    .entry("id")
                    .or_insert_with(|| Value::String(Uuid::now_v7().to_string()));
                record.entry("order").or_insert_with(|| json!(index));
                stored.push(record);
            }
            sort_by_order(&mut stored);
            collections.insert(name, stored);
        }
        Ok(Self {
            collections: Arc::new(RwLock::new(collections)),
        })
    }

    /// Records of `collection` sorted by order.
    pub async fn records(&self, collection: &str) -> Vec<Record> {
        let collections = self.collections.read().await;
        let mut records = collections.get(collection).cloned().unwrap_or_default();
        sort_by_order(&mut records);
        records
    }

    /// Names of the collections holding at least one record.
    pub async fn collection_names(&self) -> Vec<String> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

fn order_of(record: &Record) -> u64 {
    record.get("order").and_then(Value::as_u64).unwrap_or(u64::MAX)
}

fn sort_by_order(records: &mut [Record]) {
    records.sort_by_key(order_of);
}

fn id_of(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Error response in the shape the sync engine parses:
/// `{ "message": ..., "errors": { field: [..] } }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Option<Value>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    fn not_found(collection: &str, id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("no record {id} in {collection}"))
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    fn with_field(mut self, field: &str, problem: &str) -> Self {
        self.errors = Some(json!({ field: [problem] }));
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "message": self.message });
        if let Some(errors) = self.errors {
            body["errors"] = errors;
        }
        (self.status, Json(body)).into_response()
    }
}

fn payload_object(payload: Value) -> Result<Record, ApiError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::new(StatusCode::BAD_REQUEST, "payload must be a JSON object")),
    }
}

async fn list_handler(
    State(store): State<DevStore>,
    Path(collection): Path<String>,
) -> Json<Vec<Record>> {
    let records = store.records(&collection).await;
    debug!("Listed {} records of {}", records.len(), collection);
    Json(records)
}

async fn create_handler(
    State(store): State<DevStore>,
    Path(collection): Path<String>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let mut record = payload_object(payload)?;
    for field in PROTECTED {
        record.remove(field);
    }

    let mut collections = store.collections.write().await;
    let records = collections.entry(collection.clone()).or_default();
    let id = Uuid::now_v7().to_string();
    record.insert("id".into(), Value::String(id.clone()));
    record.insert("order".into(), json!(records.len()));
    records.push(record.clone());

    info!("Created {} in {}", id, collection);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn patch_handler(
    State(store): State<DevStore>,
    Path((collection, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> Result<Json<Record>, ApiError> {
    let patch = payload_object(payload)?;
    if let Some(field) = PROTECTED.iter().find(|f| patch.contains_key(**f)) {
        return Err(ApiError::invalid(format!("{field} cannot be patched"))
            .with_field(field, "is managed by the store"));
    }

    let mut collections = store.collections.write().await;
    let record = collections
        .get_mut(&collection)
        .and_then(|records| records.iter_mut().find(|r| id_of(r) == Some(id.as_str())))
        .ok_or_else(|| ApiError::not_found(&collection, &id))?;
    for (field, value) in patch {
        record.insert(field, value);
    }

    info!("Patched {} in {}", id, collection);
    Ok(Json(record.clone()))
}

async fn replace_handler(
    State(store): State<DevStore>,
    Path((collection, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> Result<Json<Record>, ApiError> {
    let mut replacement = payload_object(payload)?;

    let mut collections = store.collections.write().await;
    let record = collections
        .get_mut(&collection)
        .and_then(|records| records.iter_mut().find(|r| id_of(r) == Some(id.as_str())))
        .ok_or_else(|| ApiError::not_found(&collection, &id))?;
    for field in PROTECTED {
        match record.get(field) {
            Some(value) => replacement.insert(field.to_string(), value.clone()),
            None => replacement.remove(field),
        };
    }
    *record = replacement;

    info!("Replaced {} in {}", id, collection);
    Ok(Json(record.clone()))
}

async fn delete_handler(
    State(store): State<DevStore>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let mut collections = store.collections.write().await;
    let records = collections
        .get_mut(&collection)
        .ok_or_else(|| ApiError::not_found(&collection, &id))?;
    let index = records
        .iter()
        .position(|r| id_of(r) == Some(id.as_str()))
        .ok_or_else(|| ApiError::not_found(&collection, &id))?;
    records.remove(index);

    info!("Deleted {} from {}", id, collection);
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder_handler(
    State(store): State<DevStore>,
    Path(collection): Path<String>,
    Json(entries): Json<Vec<OrderEntry>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let mut collections = store.collections.write().await;
    let records = collections.entry(collection.clone()).or_default();

    let known: HashSet<&str> = records.iter().filter_map(id_of).collect();
    if let Some(unknown) = entries.iter().find(|e| !known.contains(e.id.as_str())) {
        return Err(ApiError::not_found(&collection, &unknown.id));
    }
    if entries.len() != records.len() {
        return Err(ApiError::invalid(format!(
            "reorder must cover all {} records, got {}",
            records.len(),
            entries.len()
        )));
    }
    let distinct: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    if distinct.len() != entries.len() {
        return Err(ApiError::invalid("reorder names a record twice"));
    }
    let orders: HashSet<u32> = entries.iter().map(|e| e.order).collect();
    if orders.len() != entries.len() || entries.iter().any(|e| e.order as usize >= entries.len()) {
        return Err(ApiError::invalid("orders must be exactly 0..n"));
    }

    let by_id: HashMap<&str, u32> = entries.iter().map(|e| (e.id.as_str(), e.order)).collect();
    for record in records.iter_mut() {
        let order = id_of(record).and_then(|id| by_id.get(id)).copied();
        if let Some(order) = order {
            record.insert("order".into(), json!(order));
        }
    }
    sort_by_order(records);

    info!("Applied reorder for {}", collection);
    Ok(Json(records.clone()))
}

/// Build the HTTP API router over `store`.
pub fn build_router(store: DevStore) -> Router {
    Router::new()
        .route("/api/{collection}", get(list_handler).post(create_handler))
        .route("/api/{collection}/reorder", put(reorder_handler))
        .route(
            "/api/{collection}/{id}",
            patch(patch_handler)
                .put(replace_handler)
                .delete(delete_handler),
        )
        .with_state(store)
}
