//! Admin session: the owner of the shared cache.

use crate::cache::{CacheEvent, LocalCache};
use crate::handle::CollectionHandle;
use crate::notify::{Notifier, TracingNotifier};
use crate::remote::{HttpStore, RemoteCollection};
use curator_types::{CollectionKey, OrderedEntity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

/// Configuration for the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period before a burst of reorders is sent (ms).
    pub debounce_ms: u64,
    /// Publish a notice for successful mutations too.
    pub notify_on_success: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 40,
            notify_on_success: false,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// One signed-in admin panel.
///
/// Owns the [`LocalCache`] every collection view reads from and hands out a
/// [`CollectionHandle`] per managed collection.
pub struct AdminSession {
    cache: Arc<LocalCache>,
    notifier: Arc<dyn Notifier>,
    config: SyncConfig,
}

impl AdminSession {
    /// Creates a session that reports notices to the tracing log.
    pub fn new(config: SyncConfig) -> Self {
        Self::with_notifier(config, Arc::new(TracingNotifier))
    }

    /// Creates a session with a custom notifier.
    pub fn with_notifier(config: SyncConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            cache: Arc::new(LocalCache::new()),
            notifier,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Change events for every collection of this session.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }

    /// Handle for kind `E`, cached under `E::COLLECTION`.
    pub fn collection<E: OrderedEntity>(&self, remote: Arc<dyn RemoteCollection<E>>) -> CollectionHandle<E> {
        self.collection_keyed(CollectionKey::new(E::COLLECTION), remote)
    }

    /// Handle for kind `E` cached under a custom key.
    pub fn collection_keyed<E: OrderedEntity>(
        &self,
        key: CollectionKey,
        remote: Arc<dyn RemoteCollection<E>>,
    ) -> CollectionHandle<E> {
        debug!("Opening collection {} at {}", key, remote.endpoint());
        CollectionHandle::new(
            key,
            Arc::clone(&self.cache),
            remote,
            Arc::clone(&self.notifier),
            self.config.clone(),
        )
    }

    /// Handle for kind `E` backed by `store` at its default endpoint.
    pub fn http_collection<E: OrderedEntity>(&self, store: &HttpStore) -> CollectionHandle<E> {
        self.collection::<E>(Arc::new(store.collection::<E>()))
    }
}
