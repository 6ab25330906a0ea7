//! Shared test helpers for sync tests.

#![allow(dead_code)]

use curator_sync::mock::MockRemote;
use curator_sync::{AdminSession, CollectionHandle, RecordingNotifier, SyncConfig};
use curator_types::{EntityId, OrderedEntity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimal ordered entity with one required and one optional payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: EntityId,
    pub order: u32,
    pub is_active: bool,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl OrderedEntity for Row {
    const COLLECTION: &'static str = "rows";

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
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

pub fn row(id: &str, order: u32) -> Row {
    Row {
        id: EntityId::new(id),
        order,
        is_active: true,
        title: format!("title {id}"),
        subtitle: None,
    }
}

/// Rows `ids[i]` with order `i`.
pub fn rows(ids: &[&str]) -> Vec<Row> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| row(id, i as u32))
        .collect()
}

pub fn id(s: &str) -> EntityId {
    EntityId::new(s)
}

/// Ids in display order.
pub fn ids(items: &[Row]) -> Vec<String> {
    items.iter().map(|r| r.id.to_string()).collect()
}

/// Orders in display order.
pub fn orders(items: &[Row]) -> Vec<u32> {
    items.iter().map(|r| r.order).collect()
}

pub struct Fixture {
    pub session: AdminSession,
    pub handle: Arc<CollectionHandle<Row>>,
    pub remote: Arc<MockRemote<Row>>,
    pub notices: Arc<RecordingNotifier>,
}

pub fn config() -> SyncConfig {
    SyncConfig::default()
}

/// Routes engine logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A session with one `rows` handle over a mock holding `items`, not loaded.
pub fn fixture(items: Vec<Row>) -> Fixture {
    init_tracing();
    let notices = Arc::new(RecordingNotifier::new());
    let session = AdminSession::with_notifier(config(), notices.clone());
    let remote = Arc::new(MockRemote::with_items(items));
    let handle = Arc::new(session.collection::<Row>(remote.clone()));
    Fixture {
        session,
        handle,
        remote,
        notices,
    }
}

/// Same as [`fixture`], with the collection already loaded.
pub async fn loaded(items: Vec<Row>) -> Fixture {
    let fx = fixture(items);
    fx.handle.ensure_loaded().await.unwrap();
    fx
}

/// Lets spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Yields until the mock has received `n` calls.
pub async fn wait_for_calls(remote: &MockRemote<Row>, n: usize) {
    for _ in 0..1000 {
        if remote.calls().len() >= n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {n} remote calls, saw {:?}", remote.calls());
}
