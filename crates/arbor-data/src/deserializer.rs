//! Applying item payloads to the backing store.
//!
//! A [`Deserializer`] turns an [`ItemData`] payload into native store
//! writes. It is constructed with a non-owning back-reference to the data
//! store it serves, so related items (such as the parent) are resolved
//! through the same lookup rules callers see.

use std::sync::{Arc, Weak};

use thiserror::Error;
use tracing::{debug, info};

use arbor_store::{DatabaseRegistry, ItemRecord, StoreError};
use arbor_types::fields::merge_fields;
use arbor_types::path::validate_name;
use arbor_types::{ItemId, ItemMetadata, ItemVersion};

use crate::error::DataStoreError;
use crate::item::ItemData;
use crate::traits::DataStore;

#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("invalid item payload {id}: {reason}")]
    InvalidPayload { id: ItemId, reason: String },

    #[error("database {0} did not exist")]
    DatabaseNotFound(String),

    #[error("parent {parent_id} of item {id} ({path}) was not found in database {database}")]
    ParentNotFound {
        database: String,
        id: ItemId,
        parent_id: ItemId,
        path: String,
    },

    #[error("the data store this deserializer belongs to has been dropped")]
    DataStoreDropped,

    #[error("lookup through the parent data store failed: {0}")]
    Lookup(#[source] Box<DataStoreError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DataStoreError> for DeserializeError {
    fn from(err: DataStoreError) -> Self {
        Self::Lookup(Box::new(err))
    }
}

/// Applies item payloads to the backing store.
pub trait Deserializer: Send + Sync {
    /// Write `item` to its database and return the stored result.
    ///
    /// With `force_overwrite` the stored item is replaced by the payload
    /// entirely. Without it, payload fields are merged into an existing item.
    fn deserialize(
        &self,
        item: &dyn ItemData,
        force_overwrite: bool,
    ) -> Result<Box<dyn ItemData>, DeserializeError>;
}

/// [`Deserializer`] writing through a [`DatabaseRegistry`].
pub struct DefaultDeserializer {
    registry: Arc<dyn DatabaseRegistry>,
    parent_data_store: Weak<dyn DataStore>,
}

impl DefaultDeserializer {
    pub fn new(registry: Arc<dyn DatabaseRegistry>, parent_data_store: Weak<dyn DataStore>) -> Self {
        Self {
            registry,
            parent_data_store,
        }
    }

    fn parent_data_store(&self) -> Result<Arc<dyn DataStore>, DeserializeError> {
        self.parent_data_store
            .upgrade()
            .ok_or(DeserializeError::DataStoreDropped)
    }

    fn validate(item: &dyn ItemData) -> Result<(), DeserializeError> {
        let invalid = |reason: &str| DeserializeError::InvalidPayload {
            id: item.id(),
            reason: reason.to_string(),
        };
        if item.id().is_nil() {
            return Err(invalid("item id cannot be nil"));
        }
        if item.database_name().is_empty() {
            return Err(invalid("database name cannot be empty"));
        }
        validate_name(item.name()).map_err(|e| invalid(&e.to_string()))?;
        if item.parent_id() == item.id() {
            return Err(invalid("an item cannot be its own parent"));
        }
        Ok(())
    }
}

fn record_from(item: &dyn ItemData) -> ItemRecord {
    ItemRecord {
        id: item.id(),
        parent_id: item.parent_id(),
        template_id: item.template_id(),
        branch_id: item.branch_id(),
        name: item.name().to_string(),
        sort_order: 0,
        shared_fields: item.shared_fields().to_vec(),
        unversioned_fields: item.unversioned_fields().to_vec(),
        versions: item.versions().to_vec(),
    }
}

/// Merge `item` into `existing`: structure comes from the payload, field
/// values are merged per field id, language and version.
fn merge_into(mut existing: ItemRecord, item: &dyn ItemData) -> ItemRecord {
    existing.parent_id = item.parent_id();
    existing.template_id = item.template_id();
    existing.branch_id = item.branch_id();
    existing.name = item.name().to_string();
    merge_fields(&mut existing.shared_fields, item.shared_fields());

    for language in item.unversioned_fields() {
        match existing
            .unversioned_fields
            .iter_mut()
            .find(|l| l.language == language.language)
        {
            Some(slot) => merge_fields(&mut slot.fields, &language.fields),
            None => existing.unversioned_fields.push(language.clone()),
        }
    }

    for version in item.versions() {
        match existing
            .versions
            .iter_mut()
            .find(|v| same_version(v, version))
        {
            Some(slot) => merge_fields(&mut slot.fields, &version.fields),
            None => existing.versions.push(version.clone()),
        }
    }
    existing
}

fn same_version(a: &ItemVersion, b: &ItemVersion) -> bool {
    a.language == b.language && a.number == b.number
}

impl Deserializer for DefaultDeserializer {
    fn deserialize(
        &self,
        item: &dyn ItemData,
        force_overwrite: bool,
    ) -> Result<Box<dyn ItemData>, DeserializeError> {
        Self::validate(item)?;
        let store = self.parent_data_store()?;
        let database = item.database_name();
        let db = self
            .registry
            .database(database)
            .ok_or_else(|| DeserializeError::DatabaseNotFound(database.to_string()))?;

        if !item.parent_id().is_nil()
            && store
                .get_by_metadata(&ItemMetadata::from_id(item.parent_id()), database)?
                .is_none()
        {
            return Err(DeserializeError::ParentNotFound {
                database: database.to_string(),
                id: item.id(),
                parent_id: item.parent_id(),
                path: item.path().to_string(),
            });
        }

        let existing = db.get_item(&item.id())?;
        let was_template_part = existing.as_ref().is_some_and(|e| db.is_template_part(e));
        let record = match existing {
            Some(existing) if !force_overwrite => merge_into(existing.record, item),
            Some(existing) => ItemRecord {
                sort_order: existing.record.sort_order,
                ..record_from(item)
            },
            None => record_from(item),
        };

        let written = db.put_item(record)?;
        if was_template_part || db.is_template_part(&written) {
            info!(database, id = %written.id(), path = %written.path, "schema item changed, resetting template engine");
            db.reset_template_engine()?;
        }
        debug!(database, id = %written.id(), path = %written.path, force_overwrite, "item deserialized");

        store
            .get_by_metadata(&ItemMetadata::from_id(written.id()), database)?
            .ok_or_else(|| {
                DeserializeError::Store(StoreError::ItemNotFound {
                    database: database.to_string(),
                    id: written.id(),
                })
            })
    }
}

impl std::fmt::Debug for DefaultDeserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultDeserializer")
            .field("databases", &self.registry.database_names())
            .field("attached", &(self.parent_data_store.strong_count() > 0))
            .finish()
    }
}
