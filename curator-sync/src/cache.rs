//! Process-wide local cache of collections.
//!
//! Each collection is stored type-erased under its [`CollectionKey`] and
//! downcast on access, so one cache serves every entity kind. Views observe
//! changes through a broadcast channel of [`CacheEvent`]s.
//!
//! The lock is held only for the synchronous body of a read or write, never
//! across a remote call. Writes are crate-private: views change a collection
//! only through its [`MutationCoordinator`](crate::MutationCoordinator).

use crate::error::{SyncError, SyncResult};
use crate::state::CollectionState;
use curator_types::{CollectionKey, EntityId, OrderedEntity};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Capacity of the change-event channel. Slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 256;

/// Why a collection's cached entry changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    /// A fresh list was fetched.
    Loaded,
    /// An optimistic write was applied.
    Optimistic,
    /// The remote store confirmed a write.
    Confirmed,
    /// A failed write was reverted.
    RolledBack,
    /// The entry was marked stale.
    Invalidated,
}

/// Emitted after every change to a cached collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub collection: CollectionKey,
    pub cause: ChangeCause,
}

type Entry = Box<dyn Any + Send + Sync>;

/// Keyed store of collection snapshots shared by every mounted view.
pub struct LocalCache {
    entries: RwLock<HashMap<CollectionKey, Entry>>,
    next_seq: AtomicU64,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            events,
        }
    }

    /// Subscribes to change events for all collections.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Returns a copy of a collection's items, or `None` if never loaded.
    pub async fn snapshot<E: OrderedEntity>(&self, key: &CollectionKey) -> SyncResult<Option<Vec<E>>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => Ok(Some(downcast_ref::<E>(key, entry)?.items().to_vec())),
            None => Ok(None),
        }
    }

    /// Looks up one entity by id.
    pub async fn get<E: OrderedEntity>(&self, key: &CollectionKey, id: &EntityId) -> SyncResult<Option<E>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => Ok(downcast_ref::<E>(key, entry)?.get(id).cloned()),
            None => Ok(None),
        }
    }

    /// Returns true if the collection is cached and not stale.
    pub async fn is_fresh<E: OrderedEntity>(&self, key: &CollectionKey) -> SyncResult<bool> {
        Ok(self
            .read::<E, _, _>(key, |state| !state.is_stale())
            .await?
            .unwrap_or(false))
    }

    /// Runs `f` against a collection's state under the read lock.
    pub async fn read<E, R, F>(&self, key: &CollectionKey, f: F) -> SyncResult<Option<R>>
    where
        E: OrderedEntity,
        F: FnOnce(&CollectionState<E>) -> R + Send,
    {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => Ok(Some(f(downcast_ref::<E>(key, entry)?))),
            None => Ok(None),
        }
    }

    /// Replaces a collection with a freshly fetched list.
    ///
    /// Ownership bookkeeping of in-flight operations survives the reload.
    pub(crate) async fn store<E: OrderedEntity>(&self, key: &CollectionKey, items: Vec<E>) -> SyncResult<()> {
        {
            let mut entries = self.entries.write().await;
            match entries.get_mut(key) {
                Some(entry) => downcast_mut::<E>(key, entry)?.replace_items(items),
                None => {
                    entries.insert(key.clone(), Box::new(CollectionState::new(items)));
                }
            }
        }
        self.emit(key, ChangeCause::Loaded);
        Ok(())
    }

    /// Marks a collection stale. Its items stay visible until the next load.
    pub(crate) async fn invalidate<E: OrderedEntity>(&self, key: &CollectionKey) -> SyncResult<bool> {
        let marked = {
            let mut entries = self.entries.write().await;
            match entries.get_mut(key) {
                Some(entry) => {
                    downcast_mut::<E>(key, entry)?.mark_stale();
                    true
                }
                None => false,
            }
        };
        if marked {
            self.emit(key, ChangeCause::Invalidated);
        }
        Ok(marked)
    }

    /// Drops a collection entirely.
    pub(crate) async fn evict(&self, key: &CollectionKey) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            debug!("Evicted collection {}", key);
        }
        removed
    }

    /// Runs `f` against a loaded collection under the write lock, then emits
    /// `cause`. Fails with `NotLoaded` if the collection was never fetched.
    pub(crate) async fn write<E, R, F>(&self, key: &CollectionKey, cause: ChangeCause, f: F) -> SyncResult<R>
    where
        E: OrderedEntity,
        F: FnOnce(&mut CollectionState<E>) -> SyncResult<R> + Send,
    {
        let result = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .get_mut(key)
                .ok_or_else(|| SyncError::NotLoaded(key.clone()))?;
            f(downcast_mut::<E>(key, entry)?)?
        };
        self.emit(key, cause);
        Ok(result)
    }

    /// Allocates the sequence number of a new pending operation.
    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn emit(&self, key: &CollectionKey, cause: ChangeCause) {
        // No subscribers is fine.
        let _ = self.events.send(CacheEvent {
            collection: key.clone(),
            cause,
        });
    }
}

fn downcast_ref<'a, E: OrderedEntity>(key: &CollectionKey, entry: &'a Entry) -> SyncResult<&'a CollectionState<E>> {
    entry
        .downcast_ref::<CollectionState<E>>()
        .ok_or_else(|| SyncError::CacheType(key.clone()))
}

fn downcast_mut<'a, E: OrderedEntity>(key: &CollectionKey, entry: &'a mut Entry) -> SyncResult<&'a mut CollectionState<E>> {
    entry
        .downcast_mut::<CollectionState<E>>()
        .ok_or_else(|| SyncError::CacheType(key.clone()))
}
