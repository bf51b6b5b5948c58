use std::sync::{Arc, Weak};

use tracing::{debug, info};

use arbor_store::{Database, DatabaseRegistry, EventState, NativeItem};
use arbor_types::ItemMetadata;

use crate::deserializer::{DefaultDeserializer, Deserializer};
use crate::error::{DataStoreError, DataStoreResult};
use crate::item::{ItemData, StoreItem};
use crate::lookup::{missing_identity, parse_path, require, single_match};
use crate::traits::DataStore;

/// [`DataStore`] adapter over live backing-store databases.
///
/// Every call resolves its database session afresh through the registry;
/// the adapter itself holds no mutable state. Saves are delegated to the
/// deserializer, which is wired at construction with a weak back-reference
/// to this adapter.
pub struct DatabaseDataStore {
    registry: Arc<dyn DatabaseRegistry>,
    events: Arc<dyn EventState>,
    deserializer: Box<dyn Deserializer>,
    this: Weak<dyn DataStore>,
}

impl DatabaseDataStore {
    /// Build the adapter and its deserializer as a pair.
    ///
    /// `make_deserializer` receives the adapter's back-reference. The
    /// deserializer must not upgrade it before this function returns.
    pub fn new<D, F>(
        registry: Arc<dyn DatabaseRegistry>,
        events: Arc<dyn EventState>,
        make_deserializer: F,
    ) -> Arc<Self>
    where
        D: Deserializer + 'static,
        F: FnOnce(Weak<dyn DataStore>) -> D,
    {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let this: Weak<dyn DataStore> = weak.clone();
            let deserializer = Box::new(make_deserializer(this.clone()));
            Self {
                registry,
                events,
                deserializer,
                this,
            }
        })
    }

    /// Build the adapter with a [`DefaultDeserializer`] writing through `registry`.
    pub fn with_default_deserializer(
        registry: Arc<dyn DatabaseRegistry>,
        events: Arc<dyn EventState>,
    ) -> Arc<Self> {
        let writer = Arc::clone(&registry);
        Self::new(registry, events, move |store| {
            DefaultDeserializer::new(writer, store)
        })
    }

    pub fn deserializer(&self) -> &dyn Deserializer {
        self.deserializer.as_ref()
    }

    fn database(&self, name: &str) -> DataStoreResult<Arc<dyn Database>> {
        require("database", name)?;
        self.registry
            .database(name)
            .ok_or_else(|| DataStoreError::DatabaseNotFound {
                database: name.to_string(),
            })
    }

    fn wrap(&self, item: NativeItem, database: &str) -> Box<dyn ItemData> {
        Box::new(StoreItem::new(item, database, self.this.clone()))
    }
}

impl DataStore for DatabaseDataStore {
    fn get_database_names(&self) -> DataStoreResult<Vec<String>> {
        Ok(self.registry.database_names())
    }

    fn save(&self, item: &dyn ItemData) -> DataStoreResult<()> {
        self.deserializer.deserialize(item, true)?;
        Ok(())
    }

    fn move_or_rename_item(
        &self,
        _item_with_final_path: &dyn ItemData,
        _old_path: &str,
    ) -> DataStoreResult<()> {
        // The backing store is never asked to move or rename.
        Err(DataStoreError::Unsupported {
            operation: "move_or_rename_item",
            store: "DatabaseDataStore",
        })
    }

    fn get_by_path(&self, path: &str, database: &str) -> DataStoreResult<Vec<Box<dyn ItemData>>> {
        require("database", database)?;
        let pattern = parse_path(path)?;
        let db = self.database(database)?;

        // Full scan, but the only query that returns every item on a path
        // rather than the first one.
        let items = db.select_items(&pattern)?;
        debug!(database, path = %pattern, matches = items.len(), "path lookup");
        Ok(items
            .into_iter()
            .map(|item| self.wrap(item, db.name()))
            .collect())
    }

    fn get_by_metadata(
        &self,
        metadata: &ItemMetadata,
        database: &str,
    ) -> DataStoreResult<Option<Box<dyn ItemData>>> {
        let db = self.database(database)?;

        if metadata.has_id() {
            let item = db.get_item(&metadata.id)?;
            return Ok(item.map(|item| self.wrap(item, db.name())));
        }

        if let Some(path) = metadata.non_blank_path() {
            let items = self.get_by_path(path, database)?;
            return single_match(path, database, items);
        }

        Err(missing_identity(database))
    }

    fn get_children(&self, parent: &dyn ItemData) -> DataStoreResult<Vec<Box<dyn ItemData>>> {
        let database = parent.database_name();
        let db = self.registry.database(database).ok_or_else(|| {
            DataStoreError::ParentDatabaseUnavailable {
                database: database.to_string(),
                id: parent.id(),
            }
        })?;

        // Re-read the parent; the caller's copy may be stale.
        let Some(native) = db.get_item(&parent.id())? else {
            debug!(database, id = %parent.id(), "parent no longer exists, no children");
            return Ok(Vec::new());
        };

        Ok(db
            .children_unsorted(&native)?
            .into_iter()
            .map(|child| self.wrap(child, db.name()))
            .collect())
    }

    fn check_consistency(
        &self,
        _database: &str,
        _fix_errors: bool,
        _log_receiver: &mut dyn FnMut(&str),
    ) -> DataStoreResult<()> {
        // Databases are always considered consistent.
        Ok(())
    }

    fn reset_template_engine(&self) -> DataStoreResult<()> {
        for db in self.registry.databases() {
            db.reset_template_engine()?;
        }
        info!("template engines reset");
        Ok(())
    }

    fn remove(&self, item: &dyn ItemData) -> DataStoreResult<bool> {
        let db = self.database(item.database_name())?;
        let id = item.id();

        let Some(native) = db.get_item(&id)? else {
            return Ok(false);
        };

        db.recycle(&native)?;

        // With events disabled the store's own cache listeners never run.
        if self.events.events_disabled() {
            db.evict_item_cache(&id)?;
            db.evict_data_cache(&id)?;
        }

        if db.is_template_part(&native) {
            info!(database = db.name(), id = %id, path = %native.path, "template item removed, resetting template engine");
            db.reset_template_engine()?;
        }

        debug!(database = db.name(), id = %id, path = %native.path, "item recycled");
        Ok(true)
    }
}

impl std::fmt::Debug for DatabaseDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseDataStore")
            .field("databases", &self.registry.database_names())
            .finish()
    }
}
