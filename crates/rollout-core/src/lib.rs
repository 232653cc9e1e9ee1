//! rollout-core: entity store, staged-change tracking, stats, and the
//! windowed table model behind the `ro` CLI.
//!
//! # Conventions
//!
//! - **Errors**: lookup misses are `Option`/`bool` no-ops; real failures
//!   use the `thiserror` enums in [`error`]. Binaries wrap them in
//!   `anyhow::Result`.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Time**: functions take `now_us` (microseconds since the Unix
//!   epoch) from the caller; the core never reads a clock.

pub mod catalog;
pub mod changes;
pub mod error;
pub mod model;
pub mod normalize;
pub mod ports;
pub mod stats;
pub mod store;
pub mod window;

pub use catalog::{Catalog, ChangeNotice, Observer, ObserverId};
pub use changes::{BatchState, ChangeKind, ChangeTarget, ChangeTracker, PendingChange};
pub use error::{ExportError, ImportError, RestoreError, StorageError};
pub use store::{DuplicateIdentity, EntityStore, Snapshot, VersionField};
