//! Backing store for Arbor.
//!
//! The store is partitioned into independently addressed named databases.
//! Each database holds a tree of items identified by [`ItemId`](arbor_types::ItemId) and located
//! by [`ItemPath`](arbor_types::ItemPath); several items may share a path.
//! Data-store adapters reach a database only through the [`Database`]
//! session trait and resolve databases by name through a
//! [`DatabaseRegistry`].
//!
//! # Backends
//!
//! - [`InMemoryDatabase`]: insertion-ordered item table with an item cache,
//!   a data cache, a recycle bin and a lazily built [`TemplateEngine`]
//! - [`InMemoryRegistry`]: ordered set of in-memory databases built from a
//!   [`StoreConfig`], persistable as a JSON [`RegistrySnapshot`]
//!
//! # Design Rules
//!
//! 1. An identifier maps to at most one item per database; paths may repeat.
//! 2. Paths are derived from the parent chain on read and never stored.
//! 3. Recycling is a soft delete: the item and its descendants move to the
//!    recycle bin and can be restored.
//! 4. Caches are invalidated automatically only while events are enabled
//!    (see [`EventState`]). With events disabled, callers evict explicitly.
//! 5. Lock poisoning is reported as [`StoreError::LockPoisoned`], never a panic.

pub mod config;
pub mod error;
pub mod events;
pub mod item;
pub mod memory;
pub mod registry;
pub mod snapshot;
pub mod template;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{DatabaseConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use events::{EventDisablerGuard, EventState, EventSwitch};
pub use item::{ItemRecord, NativeItem};
pub use memory::InMemoryDatabase;
pub use registry::InMemoryRegistry;
pub use snapshot::{DatabaseSnapshot, RecycleEntry, RegistrySnapshot};
pub use template::TemplateEngine;
pub use traits::{Database, DatabaseRegistry};
