use serde::{Deserialize, Serialize};

use crate::id::ItemId;

/// A single field value on an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Identifier of the template field this value belongs to.
    pub field_id: ItemId,
    /// Field name, informational only. Lookups always go by `field_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_hint: Option<String>,
    /// Field type name (e.g. "Single-Line Text"), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Raw string value.
    pub value: String,
}

impl FieldValue {
    pub fn new(field_id: ItemId, value: impl Into<String>) -> Self {
        Self {
            field_id,
            name_hint: None,
            field_type: None,
            value: value.into(),
        }
    }

    pub fn named(field_id: ItemId, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name_hint: Some(name.into()),
            ..Self::new(field_id, value)
        }
    }
}

/// Unversioned field values for one language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLanguage {
    pub language: String,
    #[serde(default)]
    pub fields: Vec<FieldValue>,
}

/// Versioned field values for one language and version number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVersion {
    pub language: String,
    pub number: u32,
    #[serde(default)]
    pub fields: Vec<FieldValue>,
}

/// Merge `incoming` field values into `existing`, replacing values with the
/// same field id and appending new ones.
pub fn merge_fields(existing: &mut Vec<FieldValue>, incoming: &[FieldValue]) {
    for field in incoming {
        match existing.iter_mut().find(|f| f.field_id == field.field_id) {
            Some(slot) => *slot = field.clone(),
            None => existing.push(field.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_replaces_and_appends() {
        let a = ItemId::from_u128(1);
        let b = ItemId::from_u128(2);
        let mut existing = vec![FieldValue::new(a, "old")];
        merge_fields(
            &mut existing,
            &[FieldValue::new(a, "new"), FieldValue::named(b, "Title", "hello")],
        );
        assert_eq!(existing.len(), 2);
        assert_eq!(existing[0].value, "new");
        assert_eq!(existing[1].name_hint.as_deref(), Some("Title"));
    }
}
