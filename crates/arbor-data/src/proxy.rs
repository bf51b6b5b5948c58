use std::sync::Weak;

use serde::{Deserialize, Serialize};

use arbor_types::{FieldValue, ItemId, ItemLanguage, ItemPath, ItemVersion};

use crate::error::{DataStoreError, DataStoreResult};
use crate::item::ItemData;
use crate::traits::DataStore;

/// Owned, serializable item data.
///
/// Used as the payload handed to [`DataStore::save`], as the storage shape
/// of [`InMemoryDataStore`](crate::InMemoryDataStore), and as the JSON item
/// format of the CLI. A proxy attached to a data store navigates children
/// through it; a detached proxy has no children.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyItem {
    pub id: ItemId,
    pub database_name: String,
    #[serde(default)]
    pub parent_id: ItemId,
    #[serde(default)]
    pub template_id: ItemId,
    #[serde(default)]
    pub branch_id: ItemId,
    pub name: String,
    pub path: ItemPath,
    #[serde(default)]
    pub shared_fields: Vec<FieldValue>,
    #[serde(default)]
    pub unversioned_fields: Vec<ItemLanguage>,
    #[serde(default)]
    pub versions: Vec<ItemVersion>,
    #[serde(skip)]
    store: Option<Weak<dyn DataStore>>,
}

impl ProxyItem {
    /// A detached item without fields; the name is taken from the path.
    pub fn new(
        id: ItemId,
        database_name: impl Into<String>,
        parent_id: ItemId,
        template_id: ItemId,
        path: ItemPath,
    ) -> Self {
        Self {
            id,
            database_name: database_name.into(),
            parent_id,
            template_id,
            branch_id: ItemId::nil(),
            name: path.name().to_string(),
            path,
            shared_fields: Vec::new(),
            unversioned_fields: Vec::new(),
            versions: Vec::new(),
            store: None,
        }
    }

    /// Detached copy of any item.
    pub fn from_item(item: &dyn ItemData) -> Self {
        Self {
            id: item.id(),
            database_name: item.database_name().to_string(),
            parent_id: item.parent_id(),
            template_id: item.template_id(),
            branch_id: item.branch_id(),
            name: item.name().to_string(),
            path: item.path().clone(),
            shared_fields: item.shared_fields().to_vec(),
            unversioned_fields: item.unversioned_fields().to_vec(),
            versions: item.versions().to_vec(),
            store: None,
        }
    }

    /// Attach to a data store for child navigation.
    pub fn attached(mut self, store: Weak<dyn DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Drop any data store attachment.
    pub fn detached(mut self) -> Self {
        self.store = None;
        self
    }

    /// Change the path, keeping the name in sync with its last segment.
    pub fn set_path(&mut self, path: ItemPath) {
        self.name = path.name().to_string();
        self.path = path;
    }

    pub fn with_shared_field(mut self, field: FieldValue) -> Self {
        self.shared_fields.push(field);
        self
    }

    pub fn with_version(mut self, version: ItemVersion) -> Self {
        self.versions.push(version);
        self
    }

    pub fn with_unversioned(mut self, language: ItemLanguage) -> Self {
        self.unversioned_fields.push(language);
        self
    }

    /// Parse a proxy item from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ItemData for ProxyItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }

    fn parent_id(&self) -> ItemId {
        self.parent_id
    }

    fn path(&self) -> &ItemPath {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn template_id(&self) -> ItemId {
        self.template_id
    }

    fn branch_id(&self) -> ItemId {
        self.branch_id
    }

    fn shared_fields(&self) -> &[FieldValue] {
        &self.shared_fields
    }

    fn unversioned_fields(&self) -> &[ItemLanguage] {
        &self.unversioned_fields
    }

    fn versions(&self) -> &[ItemVersion] {
        &self.versions
    }

    fn children(&self) -> DataStoreResult<Vec<Box<dyn ItemData>>> {
        match &self.store {
            None => Ok(Vec::new()),
            Some(weak) => {
                let store = weak
                    .upgrade()
                    .ok_or(DataStoreError::DataStoreDropped { id: self.id })?;
                store.get_children(self)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> ItemPath {
        ItemPath::new(s).unwrap()
    }

    #[test]
    fn name_follows_path() {
        let mut item = ProxyItem::new(
            ItemId::new_v4(),
            "master",
            ItemId::nil(),
            ItemId::nil(),
            path("/sitecore/content/home"),
        );
        assert_eq!(item.name, "home");
        item.set_path(path("/sitecore/content/start"));
        assert_eq!(item.name(), "start");
    }

    #[test]
    fn detached_proxy_has_no_children() {
        let item = ProxyItem::new(ItemId::new_v4(), "master", ItemId::nil(), ItemId::nil(), path("/a"));
        assert!(item.children().unwrap().is_empty());
    }

    #[test]
    fn from_item_copies_every_field() {
        let original = ProxyItem::new(
            ItemId::new_v4(),
            "web",
            ItemId::new_v4(),
            ItemId::new_v4(),
            path("/sitecore/content"),
        )
        .with_shared_field(FieldValue::named(ItemId::from_u128(1), "Title", "Content"))
        .with_version(ItemVersion {
            language: "en".into(),
            number: 1,
            fields: vec![FieldValue::new(ItemId::from_u128(2), "body")],
        })
        .with_unversioned(ItemLanguage {
            language: "da".into(),
            fields: vec![],
        });
        let copy = ProxyItem::from_item(&original);
        assert_eq!(copy.id, original.id);
        assert_eq!(copy.parent_id, original.parent_id);
        assert_eq!(copy.template_id, original.template_id);
        assert_eq!(copy.path, original.path);
        assert_eq!(copy.shared_fields, original.shared_fields);
        assert_eq!(copy.versions, original.versions);
        assert_eq!(copy.unversioned_fields, original.unversioned_fields);
    }

    #[test]
    fn parses_minimal_json() {
        let item = ProxyItem::from_json(
            r#"{
                "id": "6f1a5a6e-0e1b-4a0b-9c57-2c2a8e7e0b11",
                "database_name": "master",
                "name": "home",
                "path": "sitecore//content/home"
            }"#,
        )
        .unwrap();
        assert_eq!(item.path.as_str(), "/sitecore/content/home");
        assert!(item.parent_id.is_nil());
        assert!(item.shared_fields.is_empty());
    }
}
