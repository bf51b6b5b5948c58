use std::sync::Arc;

use arbor_types::{ItemId, ItemPath};

use crate::error::StoreResult;
use crate::item::{ItemRecord, NativeItem};

/// Session on one named database.
///
/// All implementations must satisfy these invariants:
/// - An identifier maps to at most one live item.
/// - A path may map to zero, one or many items; path queries return all of
///   them in the database's native order.
/// - Implementations are safe for concurrent use. No atomicity is offered
///   across calls.
pub trait Database: Send + Sync {
    /// The database name.
    fn name(&self) -> &str;

    /// Read an item by identifier.
    ///
    /// Returns `Ok(None)` if no live item has this identifier. May be served
    /// from the item cache.
    fn get_item(&self, id: &ItemId) -> StoreResult<Option<NativeItem>>;

    /// Return every live item whose path matches `pattern`.
    ///
    /// Pattern segments match case-insensitively and `*` matches any single
    /// segment. This is a full scan and the most expensive lookup available.
    fn select_items(&self, pattern: &ItemPath) -> StoreResult<Vec<NativeItem>>;

    /// Children of `parent` in raw storage order, without applying sort order.
    fn children_unsorted(&self, parent: &NativeItem) -> StoreResult<Vec<NativeItem>>;

    /// Soft-delete `item` and all of its descendants into the recycle bin.
    fn recycle(&self, item: &NativeItem) -> StoreResult<()>;

    /// Create or replace an item record. The parent must exist unless the
    /// record is top-level.
    fn put_item(&self, record: ItemRecord) -> StoreResult<NativeItem>;

    /// Drop `id` from the item cache.
    fn evict_item_cache(&self, id: &ItemId) -> StoreResult<()>;

    /// Drop `id` from the raw data cache.
    fn evict_data_cache(&self, id: &ItemId) -> StoreResult<()>;

    /// Discard cached template/schema metadata; it is rebuilt on next access.
    fn reset_template_engine(&self) -> StoreResult<()>;

    /// Returns `true` if `item` belongs to the template/schema definitions.
    fn is_template_part(&self, item: &NativeItem) -> bool;
}

/// Registry of the databases available in the running environment.
pub trait DatabaseRegistry: Send + Sync {
    /// Names of all registered databases, in registration order.
    fn database_names(&self) -> Vec<String>;

    /// Resolve a database session by name (case-insensitive).
    ///
    /// Returns `None` if no database with this name is registered.
    fn database(&self, name: &str) -> Option<Arc<dyn Database>>;

    /// All registered database sessions, in registration order.
    fn databases(&self) -> Vec<Arc<dyn Database>> {
        self.database_names()
            .iter()
            .filter_map(|name| self.database(name))
            .collect()
    }
}
