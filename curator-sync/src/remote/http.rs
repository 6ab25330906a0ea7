//! HTTP remote store.
//!
//! Speaks the plain REST shape of the admin API:
//! `GET/POST /{collection}`, `PATCH/DELETE /{collection}/{id}` and
//! `PUT /{collection}/reorder`.

use super::RemoteCollection;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use curator_types::{EntityId, FieldPatch, OrderPair, OrderedEntity};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration of the HTTP remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// Base URL the collection endpoints hang off, e.g. `https://site/api`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4010/api".to_string(),
            timeout_secs: 30,
            user_agent: format!("curator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A configured HTTP client shared by every collection of one site.
#[derive(Debug, Clone)]
pub struct HttpStore {
    config: HttpStoreConfig,
    client: Client,
}

impl HttpStore {
    pub fn new(config: HttpStoreConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpStoreConfig {
        &self.config
    }

    /// The collection of kind `E` at its default endpoint `/{COLLECTION}`.
    pub fn collection<E: OrderedEntity>(&self) -> HttpCollection<E> {
        self.collection_at(&format!("/{}", E::COLLECTION))
    }

    /// The collection of kind `E` at a custom endpoint.
    pub fn collection_at<E: OrderedEntity>(&self, endpoint: &str) -> HttpCollection<E> {
        let base = self.config.base_url.trim_end_matches('/');
        HttpCollection {
            client: self.client.clone(),
            endpoint: endpoint.to_string(),
            url: format!("{base}{endpoint}"),
            _entity: PhantomData,
        }
    }
}

/// One collection on an [`HttpStore`].
#[derive(Debug, Clone)]
pub struct HttpCollection<E> {
    client: Client,
    endpoint: String,
    url: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: OrderedEntity> HttpCollection<E> {
    fn item_url(&self, id: &EntityId) -> String {
        format!("{}/{}", self.url, id)
    }
}

/// Turns a non-success response into the matching [`SyncError`].
async fn check(response: Response, action: &str) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("{} failed with {}: {}", action, status, body);
    Err(SyncError::from_status(status.as_u16(), &body))
}

/// Strips the fields the server owns from a create payload.
fn create_body<E: OrderedEntity>(draft: &E) -> SyncResult<serde_json::Value> {
    let mut value = serde_json::to_value(draft)?;
    if let Some(object) = value.as_object_mut() {
        object.remove("id");
        object.remove("order");
    }
    Ok(value)
}

#[async_trait]
impl<E: OrderedEntity> RemoteCollection<E> for HttpCollection<E> {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn list(&self) -> SyncResult<Vec<E>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("list {} failed: {e}", self.endpoint)))?;
        let response = check(response, "list").await?;

        let items: Vec<E> = response
            .json()
            .await
            .map_err(|e| SyncError::Transport(format!("parse list response failed: {e}")))?;
        debug!("Fetched {} items from {}", items.len(), self.endpoint);
        Ok(items)
    }

    async fn create(&self, draft: &E) -> SyncResult<E> {
        let body = create_body(draft)?;
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("create in {} failed: {e}", self.endpoint)))?;
        let response = check(response, "create").await?;

        let created: E = response
            .json()
            .await
            .map_err(|e| SyncError::Transport(format!("parse create response failed: {e}")))?;
        info!("Created {} in {}", created.id(), self.endpoint);
        Ok(created)
    }

    async fn update(&self, id: &EntityId, patch: &FieldPatch) -> SyncResult<Option<E>> {
        let response = self
            .client
            .patch(self.item_url(id))
            .json(patch)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("update {id} failed: {e}")))?;
        let response = check(response, "update").await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::Transport(format!("read update response failed: {e}")))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        match serde_json::from_slice::<E>(&bytes) {
            Ok(entity) => Ok(Some(entity)),
            Err(e) => {
                // Acknowledgement bodies that are not an entity are fine.
                debug!("Update response for {} is not an entity: {}", id, e);
                Ok(None)
            }
        }
    }

    async fn delete(&self, id: &EntityId) -> SyncResult<()> {
        let response = self
            .client
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("delete {id} failed: {e}")))?;
        check(response, "delete").await?;
        info!("Deleted {} from {}", id, self.endpoint);
        Ok(())
    }

    async fn reorder(&self, pairs: &[OrderPair]) -> SyncResult<()> {
        let response = self
            .client
            .put(format!("{}/reorder", self.url))
            .json(pairs)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("reorder {} failed: {e}", self.endpoint)))?;
        check(response, "reorder").await?;
        info!("Applied reorder of {} items to {}", pairs.len(), self.endpoint);
        Ok(())
    }
}
