use serde::{Deserialize, Serialize};

use crate::id::ItemId;

/// Minimal identity descriptor used as a lookup key.
///
/// Carries just enough to ask a data store for "the item matching this
/// identity" without a full payload. An identifier, when present, always
/// takes precedence over the path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Item identifier; nil when unknown.
    #[serde(default)]
    pub id: ItemId,
    /// Raw item path; may be blank or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Template identifier; nil when unknown.
    #[serde(default)]
    pub template_id: ItemId,
}

impl ItemMetadata {
    /// Metadata describing both an identifier and a path.
    pub fn new(id: ItemId, path: impl Into<String>) -> Self {
        Self {
            id,
            path: Some(path.into()),
            template_id: ItemId::nil(),
        }
    }

    /// Metadata carrying only an identifier.
    pub fn from_id(id: ItemId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Metadata carrying only a path.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Attach a template identifier.
    pub fn with_template(mut self, template_id: ItemId) -> Self {
        self.template_id = template_id;
        self
    }

    /// Returns `true` if the identifier is set (non-nil).
    pub fn has_id(&self) -> bool {
        !self.id.is_nil()
    }

    /// The path, if it is present and not blank.
    pub fn non_blank_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Returns `true` if a non-blank path is present.
    pub fn has_path(&self) -> bool {
        self.non_blank_path().is_some()
    }
}
