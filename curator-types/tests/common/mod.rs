//! Shared test helpers for type tests.

#![allow(dead_code)]

use curator_types::{EntityId, OrderedEntity};
use serde::{Deserialize, Serialize};

/// Minimal ordered entity with one payload field and an optional one.
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
