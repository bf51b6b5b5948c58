use arbor_types::{ItemId, TypeError};

/// Errors from backing store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced item does not exist in the database.
    #[error("item {id} not found in database {database}")]
    ItemNotFound { database: String, id: ItemId },

    /// The parent of an item being written does not exist.
    #[error("parent {parent_id} of item {id} not found in database {database}")]
    ParentNotFound {
        database: String,
        id: ItemId,
        parent_id: ItemId,
    },

    /// Writing the item would make it its own ancestor.
    #[error("item {id} cannot be placed beneath itself or one of its descendants")]
    CyclicParent { id: ItemId },

    /// Attempted to write an item with the nil identifier.
    #[error("cannot store an item with a nil id")]
    NilItemId,

    /// A path, name or id failed validation.
    #[error(transparent)]
    InvalidValue(#[from] TypeError),

    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a file-backed operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    pub(crate) fn poisoned<E: std::fmt::Display>(err: E) -> Self {
        Self::LockPoisoned(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
