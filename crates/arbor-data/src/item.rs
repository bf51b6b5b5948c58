use std::fmt;
use std::sync::Weak;

use arbor_store::NativeItem;
use arbor_types::{FieldValue, ItemId, ItemLanguage, ItemMetadata, ItemPath, ItemVersion};

use crate::error::{DataStoreError, DataStoreResult};
use crate::traits::DataStore;

/// Uniform, read-oriented view of an item.
///
/// Implementations are transient projections: each read produces a new
/// instance and nothing is cached on the caller's behalf.
pub trait ItemData: Send + Sync + fmt::Debug {
    fn id(&self) -> ItemId;

    /// Name of the database the item lives in.
    fn database_name(&self) -> &str;

    /// Parent identifier; nil for a top-level item.
    fn parent_id(&self) -> ItemId;

    fn path(&self) -> &ItemPath;

    fn name(&self) -> &str;

    fn template_id(&self) -> ItemId;

    fn branch_id(&self) -> ItemId;

    fn shared_fields(&self) -> &[FieldValue];

    fn unversioned_fields(&self) -> &[ItemLanguage];

    fn versions(&self) -> &[ItemVersion];

    /// Children of this item, resolved through the data store that produced it.
    fn children(&self) -> DataStoreResult<Vec<Box<dyn ItemData>>>;

    /// Identity descriptor for this item.
    fn metadata(&self) -> ItemMetadata {
        ItemMetadata::new(self.id(), self.path().as_str()).with_template(self.template_id())
    }
}

/// [`ItemData`] wrapper around a native backing-store item.
///
/// Owns a snapshot of the native record taken at read time and a
/// non-owning handle to the data store for hierarchy navigation.
#[derive(Debug)]
pub struct StoreItem {
    item: NativeItem,
    database: String,
    store: Weak<dyn DataStore>,
}

impl StoreItem {
    pub fn new(item: NativeItem, database: impl Into<String>, store: Weak<dyn DataStore>) -> Self {
        Self {
            item,
            database: database.into(),
            store,
        }
    }

    /// The wrapped native item.
    pub fn native(&self) -> &NativeItem {
        &self.item
    }
}

impl ItemData for StoreItem {
    fn id(&self) -> ItemId {
        self.item.id()
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    fn parent_id(&self) -> ItemId {
        self.item.parent_id()
    }

    fn path(&self) -> &ItemPath {
        &self.item.path
    }

    fn name(&self) -> &str {
        self.item.name()
    }

    fn template_id(&self) -> ItemId {
        self.item.template_id()
    }

    fn branch_id(&self) -> ItemId {
        self.item.record.branch_id
    }

    fn shared_fields(&self) -> &[FieldValue] {
        &self.item.record.shared_fields
    }

    fn unversioned_fields(&self) -> &[ItemLanguage] {
        &self.item.record.unversioned_fields
    }

    fn versions(&self) -> &[ItemVersion] {
        &self.item.record.versions
    }

    fn children(&self) -> DataStoreResult<Vec<Box<dyn ItemData>>> {
        let store = self
            .store
            .upgrade()
            .ok_or(DataStoreError::DataStoreDropped { id: self.id() })?;
        store.get_children(self)
    }
}
