//! Data-store adapters for Arbor.
//!
//! A [`DataStore`] exposes a hierarchical content store through the uniform
//! [`ItemData`] abstraction used by serialization and synchronization
//! tooling. Two implementations ship here:
//!
//! - [`DatabaseDataStore`]: adapter over live backing-store databases
//!   reached through a [`DatabaseRegistry`](arbor_store::DatabaseRegistry).
//!   Saves are delegated to a [`Deserializer`] that holds a back-reference
//!   to the adapter. Move/rename is unsupported and the consistency check is
//!   a no-op.
//! - [`InMemoryDataStore`]: standalone store of [`ProxyItem`]s with real
//!   move/rename and consistency repair, for tests and tooling.
//!
//! # Lookup rules
//!
//! 1. Path lookups are exhaustive: every item on a path is returned.
//! 2. Metadata lookups prefer the identifier; a path is used only when the
//!    identifier is nil, and must then resolve to at most one item.
//! 3. Item data is a fresh, non-cached projection on every read.

pub mod deserializer;
pub mod error;
pub mod item;
pub mod lookup;
pub mod memory;
pub mod proxy;
pub mod store;
pub mod traits;

pub use deserializer::{DefaultDeserializer, DeserializeError, Deserializer};
pub use error::{DataStoreError, DataStoreResult};
pub use item::{ItemData, StoreItem};
pub use memory::InMemoryDataStore;
pub use proxy::ProxyItem;
pub use store::DatabaseDataStore;
pub use traits::DataStore;

// Re-export key types
pub use arbor_types::{ItemId, ItemMetadata, ItemPath};
