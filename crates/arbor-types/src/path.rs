use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Path segment that matches any single segment in [`ItemPath::matches_pattern`].
pub const WILDCARD_SEGMENT: &str = "*";

/// Normalized, absolute hierarchical path of an item.
///
/// Paths are `/`-separated sequences of item names. Normalization trims
/// surrounding whitespace, collapses repeated separators, strips a trailing
/// separator and guarantees a single leading separator. Segment case is
/// preserved, but the store resolves paths case-insensitively, so use
/// [`ItemPath::eq_ignore_case`] rather than `==` when comparing locations.
///
/// Uniqueness is not implied: several items can share the same path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemPath(String);

impl ItemPath {
    /// Parse and normalize a path.
    pub fn new(raw: &str) -> Result<Self, TypeError> {
        let segments: Vec<&str> = raw
            .trim()
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() {
            return Err(TypeError::InvalidPath {
                path: raw.to_string(),
                reason: "path has no segments".into(),
            });
        }
        Ok(Self(format!("/{}", segments.join("/"))))
    }

    /// A single-segment path for a top-level item.
    pub fn root(name: &str) -> Result<Self, TypeError> {
        validate_name(name)?;
        Ok(Self(format!("/{name}")))
    }

    /// The normalized path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the path's segments, top-down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').skip(1)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The last segment (the item's own name).
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// The parent path, or `None` for a top-level path.
    pub fn parent(&self) -> Option<Self> {
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            None
        } else {
            Some(Self(self.0[..idx].to_string()))
        }
    }

    /// Append a child name.
    pub fn join(&self, name: &str) -> Result<Self, TypeError> {
        validate_name(name)?;
        Ok(Self(format!("{}/{name}", self.0)))
    }

    /// Case-insensitive path equality, the comparison the store uses.
    pub fn eq_ignore_case(&self, other: &ItemPath) -> bool {
        self.depth() == other.depth()
            && self
                .segments()
                .zip(other.segments())
                .all(|(a, b)| segment_eq(a, b))
    }

    /// Returns `true` if `self` is a strict ancestor of `other` (case-insensitive).
    pub fn is_ancestor_of(&self, other: &ItemPath) -> bool {
        self.depth() < other.depth()
            && self
                .segments()
                .zip(other.segments())
                .all(|(a, b)| segment_eq(a, b))
    }

    /// Replace the `old_prefix` ancestor portion of this path with `new_prefix`.
    ///
    /// Returns `None` when `old_prefix` is neither this path nor one of its
    /// ancestors.
    pub fn rebase(&self, old_prefix: &ItemPath, new_prefix: &ItemPath) -> Option<Self> {
        if self.eq_ignore_case(old_prefix) {
            return Some(new_prefix.clone());
        }
        if !old_prefix.is_ancestor_of(self) {
            return None;
        }
        let rest: Vec<&str> = self.segments().skip(old_prefix.depth()).collect();
        Some(Self(format!("{}/{}", new_prefix.0, rest.join("/"))))
    }

    /// Match against a query pattern.
    ///
    /// A pattern is a path whose segments are either literal names (compared
    /// case-insensitively) or `*`, which matches exactly one segment of any
    /// name.
    pub fn matches_pattern(&self, pattern: &ItemPath) -> bool {
        self.depth() == pattern.depth()
            && self
                .segments()
                .zip(pattern.segments())
                .all(|(seg, pat)| pat == WILDCARD_SEGMENT || segment_eq(seg, pat))
    }

    /// Returns `true` if the path contains a wildcard segment.
    pub fn is_pattern(&self) -> bool {
        self.segments().any(|s| s == WILDCARD_SEGMENT)
    }
}

fn segment_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Validate a single item name.
///
/// Names must survive path normalization unchanged, so surrounding
/// whitespace is rejected along with blanks and separators.
pub fn validate_name(name: &str) -> Result<(), TypeError> {
    if name.trim().is_empty() || name.trim() != name || name.contains('/') {
        return Err(TypeError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl TryFrom<String> for ItemPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ItemPath> for String {
    fn from(path: ItemPath) -> Self {
        path.0
    }
}

impl std::str::FromStr for ItemPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ItemPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemPath({})", self.0)
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(s: &str) -> ItemPath {
        ItemPath::new(s).unwrap()
    }

    #[test]
    fn normalizes_separators_and_whitespace() {
        assert_eq!(p("  sitecore//content/home/ ").as_str(), "/sitecore/content/home");
        assert_eq!(p("/sitecore").as_str(), "/sitecore");
    }

    #[test]
    fn rejects_empty_paths() {
        assert!(ItemPath::new("").is_err());
        assert!(ItemPath::new("   ").is_err());
        assert!(ItemPath::new("///").is_err());
    }

    #[test]
    fn name_parent_and_depth() {
        let path = p("/sitecore/content/home");
        assert_eq!(path.name(), "home");
        assert_eq!(path.depth(), 3);
        assert_eq!(path.parent(), Some(p("/sitecore/content")));
        assert_eq!(p("/sitecore").parent(), None);
    }

    #[test]
    fn join_validates_names() {
        let path = p("/sitecore");
        assert_eq!(path.join("content").unwrap(), p("/sitecore/content"));
        assert!(path.join("").is_err());
        assert!(path.join("a/b").is_err());
    }

    #[test]
    fn names_with_surrounding_whitespace_are_rejected() {
        assert!(validate_name("home ").is_err());
        assert!(validate_name(" home").is_err());
        assert!(validate_name("\thome").is_err());
        assert!(validate_name("home page").is_ok());
        assert!(p("/sitecore").join("content ").is_err());
        assert!(ItemPath::root(" sitecore").is_err());
    }

    #[test]
    fn case_insensitive_equality() {
        assert!(p("/Sitecore/Content").eq_ignore_case(&p("/sitecore/content")));
        assert!(!p("/sitecore/content").eq_ignore_case(&p("/sitecore")));
    }

    #[test]
    fn ancestry_is_strict_and_segment_aligned() {
        let parent = p("/sitecore/content");
        assert!(parent.is_ancestor_of(&p("/sitecore/content/home")));
        assert!(!parent.is_ancestor_of(&parent));
        assert!(!parent.is_ancestor_of(&p("/sitecore/contentx/home")));
    }

    #[test]
    fn rebase_moves_subtree_paths() {
        let old = p("/sitecore/content/home");
        let new = p("/sitecore/content/start");
        assert_eq!(
            p("/sitecore/content/home/about/team").rebase(&old, &new),
            Some(p("/sitecore/content/start/about/team"))
        );
        assert_eq!(old.rebase(&old, &new), Some(new.clone()));
        assert_eq!(p("/sitecore/system").rebase(&old, &new), None);
    }

    #[test]
    fn wildcard_patterns() {
        let pattern = p("/sitecore/content/*");
        assert!(pattern.is_pattern());
        assert!(p("/sitecore/content/home").matches_pattern(&pattern));
        assert!(p("/Sitecore/Content/News").matches_pattern(&pattern));
        assert!(!p("/sitecore/content/home/child").matches_pattern(&pattern));
        assert!(!p("/sitecore/content").matches_pattern(&pattern));
    }

    #[test]
    fn serde_normalizes_on_the_way_in() {
        let path: ItemPath = serde_json::from_str("\"sitecore//content/\"").unwrap();
        assert_eq!(path.as_str(), "/sitecore/content");
        assert!(serde_json::from_str::<ItemPath>("\"/\"").is_err());
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 _-]{0,8}[A-Za-z0-9]"
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(segs in prop::collection::vec(segment(), 1..6)) {
            let raw = segs.join("//");
            let once = ItemPath::new(&raw).unwrap();
            let twice = ItemPath::new(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn path_matches_itself_in_any_case(segs in prop::collection::vec(segment(), 1..6)) {
            let path = ItemPath::new(&segs.join("/")).unwrap();
            let upper = ItemPath::new(&path.as_str().to_uppercase()).unwrap();
            prop_assert!(path.matches_pattern(&upper));
            prop_assert!(upper.eq_ignore_case(&path));
        }

        #[test]
        fn all_wildcards_match_same_depth(segs in prop::collection::vec(segment(), 1..6)) {
            let path = ItemPath::new(&segs.join("/")).unwrap();
            let pattern = ItemPath::new(&vec!["*"; path.depth()].join("/")).unwrap();
            prop_assert!(path.matches_pattern(&pattern));
        }
    }
}
