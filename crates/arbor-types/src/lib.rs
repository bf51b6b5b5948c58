//! Foundation types for Arbor.
//!
//! This crate provides the identity and value types shared by every Arbor
//! crate: the backing store, the data-store adapters and the CLI all speak
//! in terms of these types.
//!
//! # Key Types
//!
//! - [`ItemId`]: 128-bit item identifier; the nil value means "no identifier"
//! - [`ItemPath`]: Normalized hierarchical path (`/sitecore/content/home`)
//! - [`ItemMetadata`]: Minimal identity descriptor used as a lookup key
//! - [`FieldValue`], [`ItemLanguage`], [`ItemVersion`]: Field payloads
//! - [`schema`]: Well-known identifiers of schema-defining items

pub mod error;
pub mod fields;
pub mod id;
pub mod metadata;
pub mod path;
pub mod schema;

pub use error::TypeError;
pub use fields::{FieldValue, ItemLanguage, ItemVersion};
pub use id::ItemId;
pub use metadata::ItemMetadata;
pub use path::ItemPath;
