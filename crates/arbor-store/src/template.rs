use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use arbor_types::{schema, ItemId};

use crate::error::{StoreError, StoreResult};
use crate::item::ItemRecord;

/// Cached template/schema metadata for one database.
///
/// The template table (template id → template name) is built lazily from the
/// database's items the first time it is needed and then served from cache.
/// It is not refreshed when schema items change: whoever changes them must
/// call [`TemplateEngine::reset`].
#[derive(Debug, Default)]
pub struct TemplateEngine {
    templates: RwLock<Option<BTreeMap<ItemId, String>>>,
    resets: AtomicUsize,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `record` is part of the schema definitions: a
    /// template, a template section, a template field, or a standard values
    /// item.
    pub fn is_template_part(record: &ItemRecord) -> bool {
        schema::is_schema_template(&record.template_id)
            || record.name == schema::STANDARD_VALUES_NAME
    }

    /// The cached template table, building it with `load` on first use.
    pub fn templates_with<F>(&self, load: F) -> StoreResult<BTreeMap<ItemId, String>>
    where
        F: FnOnce() -> StoreResult<BTreeMap<ItemId, String>>,
    {
        if let Some(cached) = self.templates.read().map_err(StoreError::poisoned)?.as_ref() {
            return Ok(cached.clone());
        }
        let built = load()?;
        tracing::debug!(count = built.len(), "template table built");
        *self.templates.write().map_err(StoreError::poisoned)? = Some(built.clone());
        Ok(built)
    }

    /// Drop the cached template table.
    pub fn reset(&self) -> StoreResult<()> {
        *self.templates.write().map_err(StoreError::poisoned)? = None;
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Returns `true` if the template table is currently cached.
    pub fn is_loaded(&self) -> StoreResult<bool> {
        Ok(self.templates.read().map_err(StoreError::poisoned)?.is_some())
    }

    /// Number of resets since creation.
    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}
