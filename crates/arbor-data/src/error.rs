use thiserror::Error;

use arbor_types::ItemId;

use crate::deserializer::DeserializeError;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("invalid argument {argument}: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("database {database} did not exist")]
    DatabaseNotFound { database: String },

    #[error("database {database:?} of item {id} could not be resolved; possible security or consistency issue")]
    ParentDatabaseUnavailable { database: String, id: ItemId },

    #[error("ambiguous match: {0}")]
    AmbiguousMatch(String),

    #[error("{operation} is not supported by {store}")]
    Unsupported {
        operation: &'static str,
        store: &'static str,
    },

    #[error("the data store owning item {id} has been dropped")]
    DataStoreDropped { id: ItemId },

    #[error(transparent)]
    Store(#[from] arbor_store::StoreError),

    #[error(transparent)]
    Deserialize(#[from] DeserializeError),
}

impl DataStoreError {
    pub(crate) fn empty_argument(argument: &'static str) -> Self {
        Self::InvalidArgument {
            argument,
            reason: "cannot be null or empty".into(),
        }
    }

    /// Returns `true` for the not-found family (unknown database, unresolvable
    /// parent database).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DatabaseNotFound { .. } | Self::ParentDatabaseUnavailable { .. }
        )
    }
}

pub type DataStoreResult<T> = Result<T, DataStoreError>;
