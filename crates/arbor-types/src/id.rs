use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Globally unique identifier of an item.
///
/// Within one database an `ItemId` maps to at most one item. The nil UUID
/// is the default value and stands for "no identifier": lookups that carry
/// a nil id fall back to path resolution.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// The nil identifier (all zeros).
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Generate a fresh random identifier.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create from a `u128`. Mostly useful for well-known constants and tests.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Returns `true` for the nil identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    /// Parse an identifier, accepting the braced form (`{...}`) and any case.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| TypeError::InvalidId(format!("{s}: {e}")))
    }
}

impl FromStr for ItemId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.short_id())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_nil() {
        assert!(ItemId::default().is_nil());
        assert_eq!(ItemId::default(), ItemId::nil());
    }

    #[test]
    fn generated_ids_are_unique_and_not_nil() {
        let a = ItemId::new_v4();
        let b = ItemId::new_v4();
        assert_ne!(a, b);
        assert!(!a.is_nil());
    }

    #[test]
    fn parse_accepts_braces_and_uppercase() {
        let plain = ItemId::parse("110d559f-dea5-42ea-9c1c-8a5df7e70ef9").unwrap();
        let braced = ItemId::parse("{110D559F-DEA5-42EA-9C1C-8A5DF7E70EF9}").unwrap();
        assert_eq!(plain, braced);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = ItemId::parse("not-an-id").unwrap_err();
        assert!(matches!(err, TypeError::InvalidId(_)));
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        let id = ItemId::new_v4();
        let parsed: ItemId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn short_id_is_eight_chars() {
        let id = ItemId::from_u128(0xabcdef01_0000_0000_0000_000000000000);
        assert_eq!(id.short_id(), "abcdef01");
    }

    #[test]
    fn serializes_as_plain_uuid_string() {
        let id = ItemId::from_u128(1);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000001\"");
        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
