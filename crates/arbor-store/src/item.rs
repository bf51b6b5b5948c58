use serde::{Deserialize, Serialize};

use arbor_types::{FieldValue, ItemId, ItemLanguage, ItemPath, ItemVersion};

/// A stored item as the database persists it.
///
/// Records do not carry a path: the path is a function of the parent chain
/// and is computed on read (see [`NativeItem`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    /// Parent item; nil for a top-level item.
    #[serde(default)]
    pub parent_id: ItemId,
    #[serde(default)]
    pub template_id: ItemId,
    #[serde(default)]
    pub branch_id: ItemId,
    pub name: String,
    /// Position among siblings when the default (sorted) child order is used.
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub shared_fields: Vec<FieldValue>,
    #[serde(default)]
    pub unversioned_fields: Vec<ItemLanguage>,
    #[serde(default)]
    pub versions: Vec<ItemVersion>,
}

impl ItemRecord {
    /// A bare record with no fields.
    pub fn new(id: ItemId, parent_id: ItemId, template_id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            template_id,
            branch_id: ItemId::nil(),
            name: name.into(),
            sort_order: 0,
            shared_fields: Vec::new(),
            unversioned_fields: Vec::new(),
            versions: Vec::new(),
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_shared_field(mut self, field: FieldValue) -> Self {
        self.shared_fields.push(field);
        self
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_nil()
    }
}

/// An item read from a database: the stored record plus its resolved path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeItem {
    pub record: ItemRecord,
    pub path: ItemPath,
}

impl NativeItem {
    pub fn new(record: ItemRecord, path: ItemPath) -> Self {
        Self { record, path }
    }

    pub fn id(&self) -> ItemId {
        self.record.id
    }

    pub fn parent_id(&self) -> ItemId {
        self.record.parent_id
    }

    pub fn template_id(&self) -> ItemId {
        self.record.template_id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }
}
