use std::path::Path;

use serde::{Deserialize, Serialize};

use arbor_types::{ItemId, ItemPath};

use crate::error::{StoreError, StoreResult};
use crate::item::ItemRecord;

/// One recycle operation: the recycled root and every record removed with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecycleEntry {
    pub root: ItemId,
    pub original_path: ItemPath,
    /// Recycled records, parents before children.
    pub records: Vec<ItemRecord>,
}

/// Serialized contents of one database.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub name: String,
    /// Live records in storage order.
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub recycle_bin: Vec<RecycleEntry>,
}

/// Serialized contents of a whole registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub databases: Vec<DatabaseSnapshot>,
}

impl RegistrySnapshot {
    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let data = std::fs::read(path)?;
        serde_json::from_slice(&data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Write the snapshot as pretty-printed JSON, replacing the file atomically.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// The snapshot of the named database (case-insensitive).
    pub fn database(&self, name: &str) -> Option<&DatabaseSnapshot> {
        self.databases
            .iter()
            .find(|db| db.name.eq_ignore_ascii_case(name))
    }
}
