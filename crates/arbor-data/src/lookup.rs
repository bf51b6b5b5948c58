//! Argument validation and path disambiguation shared by data store
//! implementations.

use arbor_types::ItemPath;

use crate::error::{DataStoreError, DataStoreResult};
use crate::item::ItemData;

/// Fail with `InvalidArgument` if `value` is empty.
pub fn require<'a>(argument: &'static str, value: &'a str) -> DataStoreResult<&'a str> {
    if value.is_empty() {
        return Err(DataStoreError::empty_argument(argument));
    }
    Ok(value)
}

/// Parse a non-empty path argument into a query pattern.
pub fn parse_path(path: &str) -> DataStoreResult<ItemPath> {
    ItemPath::new(require("path", path)?).map_err(|e| DataStoreError::InvalidArgument {
        argument: "path",
        reason: e.to_string(),
    })
}

/// Reduce the results of a path lookup to at most one item.
pub fn single_match(
    path: &str,
    database: &str,
    mut items: Vec<Box<dyn ItemData>>,
) -> DataStoreResult<Option<Box<dyn ItemData>>> {
    match items.len() {
        0 => Ok(None),
        1 => Ok(items.pop()),
        n => Err(DataStoreError::AmbiguousMatch(format!(
            "the path {path} matched {n} items in database {database}. \
             Reduce ambiguity by passing the id as well, or use get_by_path() for multiple results"
        ))),
    }
}

/// Error for metadata that carries neither identifier nor path.
pub fn missing_identity(database: &str) -> DataStoreError {
    DataStoreError::AmbiguousMatch(format!(
        "the metadata provided did not contain a path or id. \
         Unable to look up the item in database {database} without one of those"
    ))
}
