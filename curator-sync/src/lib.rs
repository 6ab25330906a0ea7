//! Optimistic ordered-collection sync engine for Curator.
//!
//! Admin list views (testimonials, FAQs, articles, ...) mutate a local cache
//! immediately and let a remote store catch up. This crate keeps those
//! collections consistent under rapid, overlapping edits.
//!
//! # Architecture
//!
//! - **Cache**: [`LocalCache`], one type-erased entry per collection, with a
//!   broadcast channel of [`CacheEvent`]s for views
//! - **Coordinator**: [`MutationCoordinator`] runs create, update, delete,
//!   reorder and toggle-active as optimistic write + remote call + rollback
//! - **Debouncer**: [`ReorderDebouncer`] coalesces drag bursts into one
//!   remote reorder per quiet window
//! - **Gate**: [`RenderGate`] decides whether a row must repaint
//! - **Remote**: [`RemoteCollection`] with an HTTP implementation and an
//!   in-memory [`mock::MockRemote`]
//!
//! ## Rollback scoping
//!
//! Every pending operation carries a sequence number. The cache stacks the
//! pending writers of each `(entity, field)` and of the ordering, each with
//! the value it covered. A failed operation peels only its own layer: an old
//! failure never undoes a newer edit, and once every overlapping writer has
//! failed the cache is back at the last value the remote accepted.
//!
//! # Example
//!
//! ```
//! use curator_sync::{AdminSession, SyncConfig};
//!
//! let session = AdminSession::new(SyncConfig {
//!     debounce_ms: 60,
//!     ..Default::default()
//! });
//! assert_eq!(session.config().debounce_ms, 60);
//! ```

mod cache;
mod coordinator;
mod debounce;
mod error;
mod gate;
mod handle;
mod notify;
mod pending;
mod reconcile;
mod remote;
mod session;
mod state;
mod status;

pub use cache::{CacheEvent, ChangeCause, LocalCache};
pub use coordinator::MutationCoordinator;
pub use debounce::ReorderDebouncer;
pub use error::{ErrorKind, SyncError, SyncResult};
pub use gate::{BoundaryChrome, ItemProps, RenderGate, Repaint};
pub use handle::CollectionHandle;
pub use notify::{Notice, Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use pending::{OperationKind, PendingOperation};
pub use reconcile::DriftReport;
pub use remote::{mock, HttpCollection, HttpStore, HttpStoreConfig, RemoteCollection};
pub use session::{AdminSession, SyncConfig};
pub use state::CollectionState;
pub use status::{MutationStatus, StatusBoard};
