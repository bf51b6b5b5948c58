//! Standalone [`DataStore`] holding [`ProxyItem`]s.
//!
//! Items are kept per database in insertion order, exactly as they were
//! saved: paths are stored, not derived, so the store can drift out of
//! shape and [`DataStore::check_consistency`] has real work to do.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::{debug, warn};

use arbor_store::StoreError;
use arbor_types::{ItemId, ItemMetadata, ItemPath};

use crate::error::{DataStoreError, DataStoreResult};
use crate::item::ItemData;
use crate::lookup::{missing_identity, parse_path, require, single_match};
use crate::proxy::ProxyItem;
use crate::traits::DataStore;

#[derive(Debug, Default)]
struct Partition {
    name: String,
    items: Vec<ProxyItem>,
}

impl Partition {
    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// `root` and all its descendants, breadth first.
    fn subtree(&self, root: ItemId) -> Vec<ItemId> {
        let mut out = vec![root];
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            for child in self.items.iter().filter(|i| i.parent_id == id && i.id != id) {
                if !out.contains(&child.id) {
                    out.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }
        out
    }

    fn remove_all(&mut self, ids: &HashSet<ItemId>) -> usize {
        let before = self.items.len();
        self.items.retain(|i| !ids.contains(&i.id));
        before - self.items.len()
    }
}

/// Problems found by a consistency pass.
#[derive(Debug, Default)]
struct Findings {
    /// Items whose parent does not exist, with their subtrees.
    orphans: Vec<(ItemId, Vec<ItemId>)>,
    /// Items not reachable from a top-level item although their parent exists.
    unreachable: Vec<ItemId>,
    /// Items whose stored path differs from the one implied by the parent chain.
    mismatched: Vec<(ItemId, ItemPath)>,
}

fn inspect(partition: &Partition) -> Findings {
    let known: HashSet<ItemId> = partition.items.iter().map(|i| i.id).collect();
    let mut findings = Findings::default();
    let mut detached: HashSet<ItemId> = HashSet::new();

    for item in &partition.items {
        if !item.parent_id.is_nil() && !known.contains(&item.parent_id) {
            let subtree = partition.subtree(item.id);
            detached.extend(subtree.iter().copied());
            findings.orphans.push((item.id, subtree));
        }
    }

    // Walk down from top-level items computing the expected paths.
    let mut expected: HashMap<ItemId, ItemPath> = HashMap::new();
    let mut queue: VecDeque<ItemId> = VecDeque::new();
    for item in partition.items.iter().filter(|i| i.parent_id.is_nil()) {
        if let Ok(path) = ItemPath::root(&item.name) {
            expected.insert(item.id, path);
            queue.push_back(item.id);
        }
    }
    while let Some(parent) = queue.pop_front() {
        let Some(parent_path) = expected.get(&parent).cloned() else {
            continue;
        };
        for child in partition.items.iter().filter(|i| i.parent_id == parent) {
            if expected.contains_key(&child.id) {
                continue;
            }
            if let Ok(path) = parent_path.join(&child.name) {
                expected.insert(child.id, path);
                queue.push_back(child.id);
            }
        }
    }

    for item in &partition.items {
        match expected.get(&item.id) {
            Some(path) if path.as_str() != item.path.as_str() => {
                findings.mismatched.push((item.id, path.clone()));
            }
            Some(_) => {}
            None if !detached.contains(&item.id) => findings.unreachable.push(item.id),
            None => {}
        }
    }
    findings
}

fn poisoned<T>(err: PoisonError<T>) -> DataStoreError {
    DataStoreError::Store(StoreError::LockPoisoned(err.to_string()))
}

/// [`DataStore`] over in-memory [`ProxyItem`] collections.
pub struct InMemoryDataStore {
    partitions: RwLock<Vec<Partition>>,
    this: Weak<dyn DataStore>,
}

impl InMemoryDataStore {
    /// Create a store with one empty partition per database name.
    pub fn new<I, S>(database_names: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let partitions = database_names
            .into_iter()
            .map(|name| Partition {
                name: name.into(),
                items: Vec::new(),
            })
            .collect();
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let this: Weak<dyn DataStore> = weak.clone();
            Self {
                partitions: RwLock::new(partitions),
                this,
            }
        })
    }

    /// Number of items stored in `database`.
    pub fn len(&self, database: &str) -> DataStoreResult<usize> {
        self.with_partition(database, |p| p.items.len())
    }

    /// Detached copies of every item in `database`, in storage order.
    pub fn items(&self, database: &str) -> DataStoreResult<Vec<ProxyItem>> {
        self.with_partition(database, |p| p.items.clone())
    }

    fn index_of(partitions: &[Partition], database: &str) -> DataStoreResult<usize> {
        require("database", database)?;
        partitions
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(database))
            .ok_or_else(|| DataStoreError::DatabaseNotFound {
                database: database.to_string(),
            })
    }

    fn with_partition<R>(&self, database: &str, f: impl FnOnce(&Partition) -> R) -> DataStoreResult<R> {
        let partitions = self.partitions.read().map_err(poisoned)?;
        let idx = Self::index_of(&partitions, database)?;
        Ok(f(&partitions[idx]))
    }

    fn with_partition_mut<R>(
        &self,
        database: &str,
        f: impl FnOnce(&mut Partition) -> DataStoreResult<R>,
    ) -> DataStoreResult<R> {
        let mut partitions = self.partitions.write().map_err(poisoned)?;
        let idx = Self::index_of(&partitions, database)?;
        f(&mut partitions[idx])
    }

    fn attach(&self, item: &ProxyItem) -> Box<dyn ItemData> {
        Box::new(item.clone().attached(self.this.clone()))
    }
}

impl DataStore for InMemoryDataStore {
    fn get_database_names(&self) -> DataStoreResult<Vec<String>> {
        let partitions = self.partitions.read().map_err(poisoned)?;
        Ok(partitions.iter().map(|p| p.name.clone()).collect())
    }

    fn save(&self, item: &dyn ItemData) -> DataStoreResult<()> {
        if item.id().is_nil() {
            return Err(DataStoreError::InvalidArgument {
                argument: "item",
                reason: "item id cannot be nil".into(),
            });
        }
        let mut copy = ProxyItem::from_item(item);
        self.with_partition_mut(item.database_name(), |p| {
            copy.database_name = p.name.clone();
            match p.position(copy.id) {
                Some(idx) => p.items[idx] = copy,
                None => p.items.push(copy),
            }
            debug!(database = %p.name, id = %item.id(), path = %item.path(), "item saved");
            Ok(())
        })
    }

    fn move_or_rename_item(
        &self,
        item_with_final_path: &dyn ItemData,
        old_path: &str,
    ) -> DataStoreResult<()> {
        let old_path = parse_path(old_path)?;
        let new_path = item_with_final_path.path().clone();
        let id = item_with_final_path.id();

        self.with_partition_mut(item_with_final_path.database_name(), |p| {
            let idx = p.position(id).ok_or_else(|| StoreError::ItemNotFound {
                database: p.name.clone(),
                id,
            })?;
            let subtree: HashSet<ItemId> = p.subtree(id).into_iter().collect();
            let mut moved = 0usize;
            for item in p.items.iter_mut().filter(|i| i.id != id && subtree.contains(&i.id)) {
                if let Some(rebased) = item.path.rebase(&old_path, &new_path) {
                    item.path = rebased;
                    moved += 1;
                }
            }
            p.items[idx] = ProxyItem::from_item(item_with_final_path);
            debug!(
                database = %p.name,
                id = %id,
                from = %old_path,
                to = %new_path,
                descendants = moved,
                "item moved"
            );
            Ok(())
        })
    }

    fn get_by_path(&self, path: &str, database: &str) -> DataStoreResult<Vec<Box<dyn ItemData>>> {
        require("database", database)?;
        let pattern = parse_path(path)?;
        self.with_partition(database, |p| {
            p.items
                .iter()
                .filter(|i| i.path.matches_pattern(&pattern))
                .map(|i| self.attach(i))
                .collect()
        })
    }

    fn get_by_metadata(
        &self,
        metadata: &ItemMetadata,
        database: &str,
    ) -> DataStoreResult<Option<Box<dyn ItemData>>> {
        if metadata.has_id() {
            return self.with_partition(database, |p| {
                p.items
                    .iter()
                    .find(|i| i.id == metadata.id)
                    .map(|i| self.attach(i))
            });
        }
        require("database", database)?;
        match metadata.non_blank_path() {
            Some(path) => single_match(path, database, self.get_by_path(path, database)?),
            None => Err(missing_identity(database)),
        }
    }

    fn get_children(&self, parent: &dyn ItemData) -> DataStoreResult<Vec<Box<dyn ItemData>>> {
        let partitions = self.partitions.read().map_err(poisoned)?;
        let Ok(idx) = Self::index_of(&partitions, parent.database_name()) else {
            return Err(DataStoreError::ParentDatabaseUnavailable {
                database: parent.database_name().to_string(),
                id: parent.id(),
            });
        };
        Ok(partitions[idx]
            .items
            .iter()
            .filter(|i| i.parent_id == parent.id() && i.id != parent.id())
            .map(|i| self.attach(i))
            .collect())
    }

    fn check_consistency(
        &self,
        database: &str,
        fix_errors: bool,
        log_receiver: &mut dyn FnMut(&str),
    ) -> DataStoreResult<()> {
        // The receiver runs after the lock is released so it may call back
        // into the store.
        let messages = self.with_partition_mut(database, |p| {
            let findings = inspect(p);
            let mut messages = Vec::new();
            let mut report = |message: String| {
                warn!(database = %p.name, fixed = fix_errors, "{message}");
                messages.push(message);
            };
            let verb = if fix_errors { "removed" } else { "found" };

            let mut doomed: HashSet<ItemId> = HashSet::new();
            for (id, subtree) in &findings.orphans {
                if let Some(item) = p.items.iter().find(|i| i.id == *id) {
                    report(format!(
                        "orphan {verb}: {} ({id}) references missing parent {} ({} item(s) in subtree)",
                        item.path,
                        item.parent_id,
                        subtree.len()
                    ));
                }
                doomed.extend(subtree.iter().copied());
            }
            for id in &findings.unreachable {
                if let Some(item) = p.items.iter().find(|i| i.id == *id) {
                    report(format!("cyclic parent chain {verb}: {} ({id})", item.path));
                }
                doomed.insert(*id);
            }
            for (id, expected) in &findings.mismatched {
                if let Some(item) = p.items.iter().find(|i| i.id == *id) {
                    let verb = if fix_errors { "repaired" } else { "found" };
                    report(format!(
                        "path mismatch {verb}: {id} stored at {} but its parent chain gives {expected}",
                        item.path
                    ));
                }
            }

            if fix_errors {
                let removed = p.remove_all(&doomed);
                let mut repaired = 0usize;
                for (id, expected) in findings.mismatched {
                    if let Some(item) = p.items.iter_mut().find(|i| i.id == id) {
                        item.path = expected;
                        repaired += 1;
                    }
                }
                debug!(database = %p.name, removed, repaired, "consistency repaired");
            }
            Ok(messages)
        })?;
        for message in &messages {
            log_receiver(message);
        }
        Ok(())
    }

    fn reset_template_engine(&self) -> DataStoreResult<()> {
        // No template metadata is cached here.
        Ok(())
    }

    fn remove(&self, item: &dyn ItemData) -> DataStoreResult<bool> {
        let id = item.id();
        self.with_partition_mut(item.database_name(), |p| {
            if p.position(id).is_none() {
                return Ok(false);
            }
            let ids: HashSet<ItemId> = p.subtree(id).into_iter().collect();
            let removed = p.remove_all(&ids);
            debug!(database = %p.name, id = %id, removed, "item removed");
            Ok(true)
        })
    }
}

impl std::fmt::Debug for InMemoryDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.partitions.read() {
            Ok(partitions) => {
                let mut map = f.debug_map();
                for p in partitions.iter() {
                    map.entry(&p.name, &p.items.len());
                }
                map.finish()
            }
            Err(_) => f.write_str("InMemoryDataStore(<poisoned>)"),
        }
    }
}
