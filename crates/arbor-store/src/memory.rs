use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tracing::debug;

use arbor_types::path::validate_name;
use arbor_types::{schema, ItemId, ItemPath};

use crate::error::{StoreError, StoreResult};
use crate::events::EventState;
use crate::item::{ItemRecord, NativeItem};
use crate::snapshot::{DatabaseSnapshot, RecycleEntry};
use crate::template::TemplateEngine;
use crate::traits::Database;

/// Live records plus their storage order.
#[derive(Debug, Default)]
struct ItemTable {
    records: HashMap<ItemId, ItemRecord>,
    order: Vec<ItemId>,
}

impl ItemTable {
    fn get(&self, id: &ItemId) -> Option<&ItemRecord> {
        self.records.get(id)
    }

    fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Insert or replace; a replaced record keeps its storage position.
    fn upsert(&mut self, record: ItemRecord) {
        if self.records.insert(record.id, record.clone()).is_none() {
            self.order.push(record.id);
        }
    }

    fn remove_all(&mut self, ids: &HashSet<ItemId>) -> Vec<ItemRecord> {
        let removed: Vec<ItemRecord> = self
            .order
            .iter()
            .filter(|id| ids.contains(id))
            .filter_map(|id| self.records.remove(id))
            .collect();
        self.order.retain(|id| !ids.contains(id));
        removed
    }

    /// Path of `record` derived from its parent chain.
    ///
    /// A missing parent ends the walk, so an orphan resolves as if it were
    /// top-level rather than failing every scan that touches it.
    fn path_of(&self, record: &ItemRecord) -> StoreResult<ItemPath> {
        let mut names = vec![record.name.as_str()];
        let mut parent = record.parent_id;
        while !parent.is_nil() && names.len() <= self.records.len() {
            match self.records.get(&parent) {
                Some(p) => {
                    names.push(p.name.as_str());
                    parent = p.parent_id;
                }
                None => break,
            }
        }
        let mut segments = names.into_iter().rev();
        let mut path = ItemPath::root(segments.next().unwrap_or_default())?;
        for name in segments {
            path = path.join(name)?;
        }
        Ok(path)
    }

    fn native(&self, record: &ItemRecord) -> StoreResult<NativeItem> {
        Ok(NativeItem::new(record.clone(), self.path_of(record)?))
    }

    /// `root` and all of its descendants, parents before children.
    fn subtree(&self, root: ItemId) -> Vec<ItemId> {
        let mut ids = vec![root];
        let mut idx = 0;
        while idx < ids.len() {
            let current = ids[idx];
            ids.extend(self.iter().filter(|r| r.parent_id == current).map(|r| r.id));
            idx += 1;
        }
        ids
    }

    /// Returns `true` if `ancestor` appears in the parent chain starting at `start`.
    fn chain_contains(&self, start: ItemId, ancestor: ItemId) -> bool {
        let mut current = start;
        let mut steps = 0;
        while !current.is_nil() && steps <= self.records.len() {
            if current == ancestor {
                return true;
            }
            current = self.records.get(&current).map(|r| r.parent_id).unwrap_or_default();
            steps += 1;
        }
        false
    }
}

/// In-memory database session.
///
/// Holds items in insertion order behind `RwLock`s. Reads by id go through
/// an item cache (resolved items) backed by a data cache (raw records);
/// both are filled on read. A write always drops the written item's own
/// entries and a recycle always drops the recycled item's descendants.
/// The rest (the recycled item itself, and descendant paths changed by a
/// rename or move) is invalidated only while events are enabled; with
/// events disabled those entries survive until evicted explicitly.
pub struct InMemoryDatabase {
    name: String,
    events: Arc<dyn EventState>,
    table: RwLock<ItemTable>,
    recycle_bin: RwLock<Vec<RecycleEntry>>,
    item_cache: RwLock<HashMap<ItemId, NativeItem>>,
    data_cache: RwLock<HashMap<ItemId, ItemRecord>>,
    template_engine: TemplateEngine,
}

impl InMemoryDatabase {
    /// Create an empty database.
    pub fn new(name: impl Into<String>, events: Arc<dyn EventState>) -> Self {
        Self {
            name: name.into(),
            events,
            table: RwLock::new(ItemTable::default()),
            recycle_bin: RwLock::new(Vec::new()),
            item_cache: RwLock::new(HashMap::new()),
            data_cache: RwLock::new(HashMap::new()),
            template_engine: TemplateEngine::new(),
        }
    }

    /// Number of live items.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.table.read().map_err(StoreError::poisoned)?.records.len())
    }

    /// Returns `true` if the database holds no live items.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Children of `parent` in default order: sort order, then name.
    pub fn children_sorted(&self, parent: &NativeItem) -> StoreResult<Vec<NativeItem>> {
        let mut children = self.children_unsorted(parent)?;
        children.sort_by(|a, b| {
            a.record
                .sort_order
                .cmp(&b.record.sort_order)
                .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        });
        Ok(children)
    }

    /// Template table (template id → name), served from the template engine.
    pub fn templates(&self) -> StoreResult<BTreeMap<ItemId, String>> {
        self.template_engine.templates_with(|| {
            let table = self.table.read().map_err(StoreError::poisoned)?;
            Ok(table
                .iter()
                .filter(|r| r.template_id == schema::TEMPLATE)
                .map(|r| (r.id, r.name.clone()))
                .collect())
        })
    }

    pub fn template_engine(&self) -> &TemplateEngine {
        &self.template_engine
    }

    /// Current recycle bin contents, oldest first.
    pub fn recycle_bin(&self) -> StoreResult<Vec<RecycleEntry>> {
        Ok(self.recycle_bin.read().map_err(StoreError::poisoned)?.clone())
    }

    /// Restore a recycled subtree by the id of its recycled root.
    ///
    /// Returns `Ok(false)` if the bin has no entry for `root`.
    pub fn restore(&self, root: &ItemId) -> StoreResult<bool> {
        let mut bin = self.recycle_bin.write().map_err(StoreError::poisoned)?;
        let Some(pos) = bin.iter().position(|e| e.root == *root) else {
            return Ok(false);
        };
        let mut table = self.table.write().map_err(StoreError::poisoned)?;
        let entry = &bin[pos];
        if let Some(first) = entry.records.first() {
            if !first.parent_id.is_nil() && table.get(&first.parent_id).is_none() {
                return Err(StoreError::ParentNotFound {
                    database: self.name.clone(),
                    id: first.id,
                    parent_id: first.parent_id,
                });
            }
        }
        let entry = bin.remove(pos);
        for record in &entry.records {
            table.upsert(record.clone());
        }
        drop(table);
        let ids: Vec<ItemId> = entry.records.iter().map(|r| r.id).collect();
        self.forget(&ids)?;
        debug!(database = %self.name, root = %root, count = ids.len(), "restored from recycle bin");
        Ok(true)
    }

    /// Returns `true` if `id` currently sits in the item cache.
    pub fn is_item_cached(&self, id: &ItemId) -> StoreResult<bool> {
        Ok(self.item_cache.read().map_err(StoreError::poisoned)?.contains_key(id))
    }

    /// Returns `true` if `id` currently sits in the data cache.
    pub fn is_data_cached(&self, id: &ItemId) -> StoreResult<bool> {
        Ok(self.data_cache.read().map_err(StoreError::poisoned)?.contains_key(id))
    }

    /// Capture live items and recycle bin.
    pub fn snapshot(&self) -> StoreResult<DatabaseSnapshot> {
        let recycle_bin = self.recycle_bin()?;
        let table = self.table.read().map_err(StoreError::poisoned)?;
        Ok(DatabaseSnapshot {
            name: self.name.clone(),
            items: table.iter().cloned().collect(),
            recycle_bin,
        })
    }

    /// Replace all contents with `snapshot`, dropping caches and template metadata.
    ///
    /// Records are loaded as-is, without parent validation.
    pub fn load_snapshot(&self, snapshot: &DatabaseSnapshot) -> StoreResult<()> {
        let mut table = ItemTable::default();
        for record in &snapshot.items {
            table.upsert(record.clone());
        }
        *self.table.write().map_err(StoreError::poisoned)? = table;
        *self.recycle_bin.write().map_err(StoreError::poisoned)? = snapshot.recycle_bin.clone();
        self.item_cache.write().map_err(StoreError::poisoned)?.clear();
        self.data_cache.write().map_err(StoreError::poisoned)?.clear();
        self.template_engine.reset()?;
        debug!(database = %self.name, items = snapshot.items.len(), "snapshot loaded");
        Ok(())
    }

    /// Drop `ids` from both caches.
    fn forget(&self, ids: &[ItemId]) -> StoreResult<()> {
        let mut items = self.item_cache.write().map_err(StoreError::poisoned)?;
        let mut data = self.data_cache.write().map_err(StoreError::poisoned)?;
        for id in ids {
            items.remove(id);
            data.remove(id);
        }
        Ok(())
    }
}

impl Database for InMemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_item(&self, id: &ItemId) -> StoreResult<Option<NativeItem>> {
        if let Some(hit) = self.item_cache.read().map_err(StoreError::poisoned)?.get(id) {
            return Ok(Some(hit.clone()));
        }
        let table = self.table.read().map_err(StoreError::poisoned)?;
        let cached_record = self.data_cache.read().map_err(StoreError::poisoned)?.get(id).cloned();
        let record = match cached_record.or_else(|| table.get(id).cloned()) {
            Some(record) => record,
            None => return Ok(None),
        };
        let item = table.native(&record)?;
        drop(table);

        self.data_cache
            .write()
            .map_err(StoreError::poisoned)?
            .insert(*id, record);
        self.item_cache
            .write()
            .map_err(StoreError::poisoned)?
            .insert(*id, item.clone());
        Ok(Some(item))
    }

    fn select_items(&self, pattern: &ItemPath) -> StoreResult<Vec<NativeItem>> {
        let table = self.table.read().map_err(StoreError::poisoned)?;
        let mut matches = Vec::new();
        for record in table.iter() {
            let path = table.path_of(record)?;
            if path.matches_pattern(pattern) {
                matches.push(NativeItem::new(record.clone(), path));
            }
        }
        Ok(matches)
    }

    fn children_unsorted(&self, parent: &NativeItem) -> StoreResult<Vec<NativeItem>> {
        let table = self.table.read().map_err(StoreError::poisoned)?;
        table
            .iter()
            .filter(|r| r.parent_id == parent.id())
            .map(|r| table.native(r))
            .collect()
    }

    fn recycle(&self, item: &NativeItem) -> StoreResult<()> {
        let mut table = self.table.write().map_err(StoreError::poisoned)?;
        let Some(root) = table.get(&item.id()).cloned() else {
            return Err(StoreError::ItemNotFound {
                database: self.name.clone(),
                id: item.id(),
            });
        };
        let original_path = table.path_of(&root)?;
        let subtree = table.subtree(root.id);
        let ids: HashSet<ItemId> = subtree.iter().copied().collect();
        let records = table.remove_all(&ids);
        drop(table);

        debug!(
            database = %self.name,
            id = %root.id,
            path = %original_path,
            count = records.len(),
            "recycled"
        );
        self.recycle_bin
            .write()
            .map_err(StoreError::poisoned)?
            .push(RecycleEntry {
                root: root.id,
                original_path,
                records,
            });

        // Descendants are never left behind in the caches; the subtree root
        // waits for an explicit eviction while events are disabled.
        self.forget(&subtree[1..])?;
        if !self.events.events_disabled() {
            self.forget(&subtree[..1])?;
        }
        Ok(())
    }

    fn put_item(&self, record: ItemRecord) -> StoreResult<NativeItem> {
        if record.id.is_nil() {
            return Err(StoreError::NilItemId);
        }
        validate_name(&record.name)?;

        let mut table = self.table.write().map_err(StoreError::poisoned)?;
        if !record.parent_id.is_nil() {
            if table.get(&record.parent_id).is_none() {
                return Err(StoreError::ParentNotFound {
                    database: self.name.clone(),
                    id: record.id,
                    parent_id: record.parent_id,
                });
            }
            if table.chain_contains(record.parent_id, record.id) {
                return Err(StoreError::CyclicParent { id: record.id });
            }
        }
        let id = record.id;
        table.upsert(record);
        let item = table
            .get(&id)
            .map(|r| table.native(r))
            .transpose()?
            .ok_or_else(|| StoreError::ItemNotFound {
                database: self.name.clone(),
                id,
            })?;
        drop(table);

        self.forget(&[id])?;
        if !self.events.events_disabled() {
            // A rename or move changes every descendant's path.
            self.item_cache.write().map_err(StoreError::poisoned)?.clear();
        }
        debug!(database = %self.name, id = %id, path = %item.path, "item written");
        Ok(item)
    }

    fn evict_item_cache(&self, id: &ItemId) -> StoreResult<()> {
        self.item_cache.write().map_err(StoreError::poisoned)?.remove(id);
        Ok(())
    }

    fn evict_data_cache(&self, id: &ItemId) -> StoreResult<()> {
        self.data_cache.write().map_err(StoreError::poisoned)?.remove(id);
        Ok(())
    }

    fn reset_template_engine(&self) -> StoreResult<()> {
        debug!(database = %self.name, "template engine reset");
        self.template_engine.reset()
    }

    fn is_template_part(&self, item: &NativeItem) -> bool {
        TemplateEngine::is_template_part(&item.record)
    }
}

impl std::fmt::Debug for InMemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryDatabase")
            .field("name", &self.name)
            .field("item_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventSwitch;
    use arbor_types::FieldValue;

    struct Fixture {
        events: Arc<EventSwitch>,
        db: InMemoryDatabase,
    }

    fn fixture() -> Fixture {
        let events = Arc::new(EventSwitch::new());
        let db = InMemoryDatabase::new("master", events.clone());
        Fixture { events, db }
    }

    fn put(db: &InMemoryDatabase, id: u128, parent: u128, name: &str) -> NativeItem {
        db.put_item(ItemRecord::new(
            ItemId::from_u128(id),
            ItemId::from_u128(parent),
            ItemId::nil(),
            name,
        ))
        .unwrap()
    }

    fn path(s: &str) -> ItemPath {
        ItemPath::new(s).unwrap()
    }

    // -----------------------------------------------------------------------
    // Writes and paths
    // -----------------------------------------------------------------------

    #[test]
    fn paths_follow_parent_chain() {
        let f = fixture();
        put(&f.db, 1, 0, "sitecore");
        put(&f.db, 2, 1, "content");
        let home = put(&f.db, 3, 2, "home");
        assert_eq!(home.path, path("/sitecore/content/home"));
        assert_eq!(f.db.len().unwrap(), 3);
    }

    #[test]
    fn rename_changes_descendant_paths() {
        let f = fixture();
        put(&f.db, 1, 0, "sitecore");
        put(&f.db, 2, 1, "content");
        put(&f.db, 3, 2, "home");
        assert_eq!(
            f.db.get_item(&ItemId::from_u128(3)).unwrap().unwrap().path,
            path("/sitecore/content/home")
        );

        put(&f.db, 2, 1, "pages");
        let home = f.db.get_item(&ItemId::from_u128(3)).unwrap().unwrap();
        assert_eq!(home.path, path("/sitecore/pages/home"));
    }

    #[test]
    fn put_rejects_missing_parent_nil_id_and_cycles() {
        let f = fixture();
        let err = f
            .db
            .put_item(ItemRecord::new(ItemId::from_u128(5), ItemId::from_u128(99), ItemId::nil(), "x"))
            .unwrap_err();
        assert!(matches!(err, StoreError::ParentNotFound { .. }));

        let err = f
            .db
            .put_item(ItemRecord::new(ItemId::nil(), ItemId::nil(), ItemId::nil(), "x"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NilItemId));

        put(&f.db, 1, 0, "a");
        put(&f.db, 2, 1, "b");
        let err = f
            .db
            .put_item(ItemRecord::new(ItemId::from_u128(1), ItemId::from_u128(2), ItemId::nil(), "a"))
            .unwrap_err();
        assert!(matches!(err, StoreError::CyclicParent { .. }));
    }

    #[test]
    fn put_rejects_invalid_names() {
        let f = fixture();
        let err = f
            .db
            .put_item(ItemRecord::new(ItemId::from_u128(1), ItemId::nil(), ItemId::nil(), "a/b"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue(_)));
    }

    #[test]
    fn replace_keeps_storage_position_and_fields() {
        let f = fixture();
        put(&f.db, 1, 0, "root");
        put(&f.db, 2, 1, "b");
        put(&f.db, 3, 1, "a");
        let record = ItemRecord::new(ItemId::from_u128(2), ItemId::from_u128(1), ItemId::nil(), "b")
            .with_shared_field(FieldValue::new(ItemId::from_u128(50), "value"));
        f.db.put_item(record).unwrap();

        let root = f.db.get_item(&ItemId::from_u128(1)).unwrap().unwrap();
        let names: Vec<String> = f
            .db
            .children_unsorted(&root)
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
        let b = f.db.get_item(&ItemId::from_u128(2)).unwrap().unwrap();
        assert_eq!(b.record.shared_fields.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[test]
    fn select_returns_all_duplicates_in_storage_order() {
        let f = fixture();
        put(&f.db, 1, 0, "sitecore");
        put(&f.db, 3, 1, "dup");
        put(&f.db, 2, 1, "other");
        put(&f.db, 4, 1, "Dup");

        let found = f.db.select_items(&path("/sitecore/dup")).unwrap();
        let ids: Vec<ItemId> = found.iter().map(NativeItem::id).collect();
        assert_eq!(ids, vec![ItemId::from_u128(3), ItemId::from_u128(4)]);

        assert!(f.db.select_items(&path("/sitecore/missing")).unwrap().is_empty());
        assert_eq!(f.db.select_items(&path("/sitecore/*")).unwrap().len(), 3);
    }

    #[test]
    fn unsorted_children_keep_storage_order_sorted_children_do_not() {
        let f = fixture();
        let root = put(&f.db, 1, 0, "root");
        for (id, name, order) in [(2, "zeta", 10), (3, "alpha", 30), (4, "mid", 20)] {
            f.db.put_item(
                ItemRecord::new(ItemId::from_u128(id), ItemId::from_u128(1), ItemId::nil(), name)
                    .with_sort_order(order),
            )
            .unwrap();
        }

        let unsorted: Vec<String> = f
            .db
            .children_unsorted(&root)
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(unsorted, vec!["zeta", "alpha", "mid"]);

        let sorted: Vec<String> = f
            .db
            .children_sorted(&root)
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(sorted, vec!["zeta", "mid", "alpha"]);
    }

    // -----------------------------------------------------------------------
    // Recycle bin and caches
    // -----------------------------------------------------------------------

    #[test]
    fn recycle_moves_subtree_to_bin_and_restore_brings_it_back() {
        let f = fixture();
        put(&f.db, 1, 0, "sitecore");
        let content = put(&f.db, 2, 1, "content");
        put(&f.db, 3, 2, "home");

        f.db.recycle(&content).unwrap();
        assert_eq!(f.db.len().unwrap(), 1);
        assert!(f.db.get_item(&ItemId::from_u128(3)).unwrap().is_none());

        let bin = f.db.recycle_bin().unwrap();
        assert_eq!(bin.len(), 1);
        assert_eq!(bin[0].records.len(), 2);
        assert_eq!(bin[0].original_path, path("/sitecore/content"));

        assert!(f.db.restore(&ItemId::from_u128(2)).unwrap());
        assert_eq!(f.db.len().unwrap(), 3);
        assert!(f.db.recycle_bin().unwrap().is_empty());
        assert!(!f.db.restore(&ItemId::from_u128(2)).unwrap());
    }

    #[test]
    fn restore_requires_parent() {
        let f = fixture();
        let root = put(&f.db, 1, 0, "root");
        let child = put(&f.db, 2, 1, "child");
        f.db.recycle(&child).unwrap();
        f.db.recycle(&root).unwrap();
        let err = f.db.restore(&ItemId::from_u128(2)).unwrap_err();
        assert!(matches!(err, StoreError::ParentNotFound { .. }));
    }

    #[test]
    fn recycle_missing_item_fails() {
        let f = fixture();
        let ghost = NativeItem::new(
            ItemRecord::new(ItemId::from_u128(9), ItemId::nil(), ItemId::nil(), "ghost"),
            path("/ghost"),
        );
        assert!(matches!(
            f.db.recycle(&ghost).unwrap_err(),
            StoreError::ItemNotFound { .. }
        ));
    }

    #[test]
    fn recycle_with_events_enabled_invalidates_caches() {
        let f = fixture();
        let item = put(&f.db, 1, 0, "root");
        f.db.get_item(&item.id()).unwrap();
        assert!(f.db.is_item_cached(&item.id()).unwrap());

        f.db.recycle(&item).unwrap();
        assert!(!f.db.is_item_cached(&item.id()).unwrap());
        assert!(!f.db.is_data_cached(&item.id()).unwrap());
        assert!(f.db.get_item(&item.id()).unwrap().is_none());
    }

    #[test]
    fn recycle_with_events_disabled_leaves_stale_cache_until_evicted() {
        let f = fixture();
        let item = put(&f.db, 1, 0, "root");
        f.db.get_item(&item.id()).unwrap();

        {
            let _guard = f.events.disable();
            f.db.recycle(&item).unwrap();
        }
        // Stale read served from the item cache.
        assert!(f.db.get_item(&item.id()).unwrap().is_some());

        f.db.evict_item_cache(&item.id()).unwrap();
        // Still stale: the raw record is in the data cache.
        assert!(f.db.get_item(&item.id()).unwrap().is_some());

        f.db.evict_item_cache(&item.id()).unwrap();
        f.db.evict_data_cache(&item.id()).unwrap();
        assert!(f.db.get_item(&item.id()).unwrap().is_none());
    }

    #[test]
    fn recycle_with_events_disabled_still_drops_descendants() {
        let f = fixture();
        let root = put(&f.db, 1, 0, "root");
        put(&f.db, 2, 1, "child");
        put(&f.db, 3, 2, "grandchild");
        for id in [1, 2, 3] {
            f.db.get_item(&ItemId::from_u128(id)).unwrap();
        }

        {
            let _guard = f.events.disable();
            f.db.recycle(&root).unwrap();
        }
        for id in [2, 3] {
            let id = ItemId::from_u128(id);
            assert!(!f.db.is_item_cached(&id).unwrap());
            assert!(!f.db.is_data_cached(&id).unwrap());
            assert!(f.db.get_item(&id).unwrap().is_none());
        }
        assert!(f.db.is_item_cached(&root.id()).unwrap());
    }

    #[test]
    fn rename_with_events_disabled_keeps_descendant_paths_until_evicted() {
        let f = fixture();
        put(&f.db, 1, 0, "site");
        let child = put(&f.db, 2, 1, "home");
        f.db.get_item(&child.id()).unwrap();

        {
            let _guard = f.events.disable();
            put(&f.db, 1, 0, "portal");
        }
        // The written item itself is always fresh.
        let parent = f.db.get_item(&ItemId::from_u128(1)).unwrap().unwrap();
        assert_eq!(parent.path, path("/portal"));

        let cached = f.db.get_item(&child.id()).unwrap().unwrap();
        assert_eq!(cached.path, path("/site/home"));

        f.db.evict_item_cache(&child.id()).unwrap();
        let fresh = f.db.get_item(&child.id()).unwrap().unwrap();
        assert_eq!(fresh.path, path("/portal/home"));
    }

    // -----------------------------------------------------------------------
    // Template engine
    // -----------------------------------------------------------------------

    #[test]
    fn template_table_is_cached_until_reset() {
        let f = fixture();
        let folder = put(&f.db, 1, 0, "templates");
        let page = f
            .db
            .put_item(ItemRecord::new(ItemId::from_u128(2), folder.id(), schema::TEMPLATE, "Page"))
            .unwrap();
        assert!(f.db.is_template_part(&page));
        assert!(!f.db.is_template_part(&folder));
        assert_eq!(f.db.templates().unwrap().len(), 1);

        f.db.recycle(&page).unwrap();
        // Stale until someone resets the engine.
        assert_eq!(f.db.templates().unwrap().len(), 1);
        f.db.reset_template_engine().unwrap();
        assert!(f.db.templates().unwrap().is_empty());
        assert_eq!(f.db.template_engine().reset_count(), 1);
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_roundtrip_preserves_order_and_bin() {
        let f = fixture();
        put(&f.db, 1, 0, "root");
        put(&f.db, 3, 1, "b");
        let a = put(&f.db, 2, 1, "a");
        f.db.recycle(&a).unwrap();

        let snapshot = f.db.snapshot().unwrap();
        let other = InMemoryDatabase::new("master", f.events.clone());
        other.load_snapshot(&snapshot).unwrap();
        assert_eq!(other.snapshot().unwrap(), snapshot);
        assert_eq!(other.recycle_bin().unwrap().len(), 1);
    }

    #[test]
    fn debug_format() {
        let f = fixture();
        put(&f.db, 1, 0, "root");
        let debug = format!("{:?}", f.db);
        assert!(debug.contains("InMemoryDatabase"));
        assert!(debug.contains("item_count"));
    }
}
