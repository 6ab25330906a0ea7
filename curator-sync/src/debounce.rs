//! Reorder debouncer.
//!
//! A drag gesture emits many candidate orderings. Each one is applied to the
//! cache at once, but only the last ordering of a quiet window is sent. The
//! window's undo record is the ordering before its first `schedule`, so a
//! failure snaps the list back to where the gesture started.

use crate::coordinator::MutationCoordinator;
use crate::error::SyncResult;
use crate::pending::PendingOperation;
use curator_types::{OrderPair, OrderedEntity};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// An open coalescing window.
struct Window<E> {
    op: PendingOperation<E>,
    latest: Vec<OrderPair>,
    /// Bumped on every `schedule`; a timer only fires its own generation.
    generation: u64,
    timer: JoinHandle<()>,
}

/// Coalesces bursts of reorders into one remote call per quiet window.
pub struct ReorderDebouncer<E: OrderedEntity> {
    coordinator: Arc<MutationCoordinator<E>>,
    delay: Duration,
    window: Arc<Mutex<Option<Window<E>>>>,
}

impl<E: OrderedEntity> ReorderDebouncer<E> {
    pub fn new(coordinator: Arc<MutationCoordinator<E>>, delay: Duration) -> Self {
        Self {
            coordinator,
            delay,
            window: Arc::new(Mutex::new(None)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Applies `pairs` to the cache now and (re)starts the window timer.
    ///
    /// An invalid ordering is rejected without touching the open window.
    pub async fn schedule(&self, pairs: Vec<OrderPair>) -> SyncResult<()> {
        let mut guard = self.window.lock().await;
        if let Some(window) = guard.as_mut() {
            self.coordinator.extend_reorder(&window.op, &pairs).await?;
            window.timer.abort();
            window.latest = pairs;
            window.generation += 1;
            window.timer = self.arm(window.generation);
            debug!(
                "Extended reorder window #{} for {} (generation {})",
                window.op.seq(),
                self.coordinator.key(),
                window.generation
            );
            return Ok(());
        }

        let op = self.coordinator.begin_reorder(&pairs).await?;
        debug!("Opened reorder window #{} for {}", op.seq(), self.coordinator.key());
        *guard = Some(Window {
            op,
            latest: pairs,
            generation: 0,
            timer: self.arm(0),
        });
        Ok(())
    }

    /// Sends the open window now instead of waiting for the timer.
    pub async fn flush(&self) -> SyncResult<()> {
        let window = self.window.lock().await.take();
        match window {
            Some(window) => {
                window.timer.abort();
                self.coordinator.commit_reorder(window.op, window.latest).await
            }
            None => Ok(()),
        }
    }

    /// True while a window is open and its ordering not yet sent.
    pub async fn has_pending(&self) -> bool {
        self.window.lock().await.is_some()
    }

    fn arm(&self, generation: u64) -> JoinHandle<()> {
        let coordinator = Arc::clone(&self.coordinator);
        let window = Arc::clone(&self.window);
        // Fixed at schedule time, not at the task's first poll.
        let deadline = Instant::now() + self.delay;
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let expired = {
                let mut guard = window.lock().await;
                if guard.as_ref().is_some_and(|open| open.generation == generation) {
                    guard.take()
                } else {
                    None
                }
            };
            if let Some(expired) = expired {
                if let Err(e) = coordinator.commit_reorder(expired.op, expired.latest).await {
                    // Already rolled back and reported by the coordinator.
                    warn!("Debounced reorder for {} failed: {}", coordinator.key(), e);
                }
            }
        })
    }
}
