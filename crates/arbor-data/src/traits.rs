//! The [`DataStore`] trait shared by every item store implementation.

use arbor_types::{ItemId, ItemMetadata};

use crate::error::DataStoreResult;
use crate::item::ItemData;

/// Uniform access to a hierarchical content store.
///
/// Implementations must be thread-safe (`Send + Sync`). Operations are
/// synchronous; no atomicity is offered across calls.
pub trait DataStore: Send + Sync {
    /// Names of all databases this store can address.
    fn get_database_names(&self) -> DataStoreResult<Vec<String>>;

    /// Create or overwrite an item from its full data.
    fn save(&self, item: &dyn ItemData) -> DataStoreResult<()>;

    /// Move or rename `item_with_final_path`, previously located at `old_path`.
    fn move_or_rename_item(
        &self,
        item_with_final_path: &dyn ItemData,
        old_path: &str,
    ) -> DataStoreResult<()>;

    /// Every item whose path matches `path`. Empty when nothing matches.
    fn get_by_path(&self, path: &str, database: &str) -> DataStoreResult<Vec<Box<dyn ItemData>>>;

    /// The single item matching `metadata`.
    ///
    /// A non-nil identifier is authoritative and the path is ignored.
    /// Otherwise the path must match at most one item; more than one match
    /// is an [`AmbiguousMatch`](crate::DataStoreError::AmbiguousMatch), as is
    /// metadata with neither identifier nor path.
    fn get_by_metadata(
        &self,
        metadata: &ItemMetadata,
        database: &str,
    ) -> DataStoreResult<Option<Box<dyn ItemData>>>;

    /// Direct children of `parent`.
    fn get_children(&self, parent: &dyn ItemData) -> DataStoreResult<Vec<Box<dyn ItemData>>>;

    /// Verify (and with `fix_errors`, repair) the store, reporting each
    /// finding to `log_receiver`.
    fn check_consistency(
        &self,
        database: &str,
        fix_errors: bool,
        log_receiver: &mut dyn FnMut(&str),
    ) -> DataStoreResult<()>;

    /// Discard cached template/schema metadata in every database.
    fn reset_template_engine(&self) -> DataStoreResult<()>;

    /// Delete `item`. Returns `Ok(false)` if it did not exist.
    fn remove(&self, item: &dyn ItemData) -> DataStoreResult<bool>;

    /// Look up an item by identifier alone.
    fn get_by_id(&self, id: ItemId, database: &str) -> DataStoreResult<Option<Box<dyn ItemData>>> {
        self.get_by_metadata(&ItemMetadata::from_id(id), database)
    }
}
