use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid item id: {0}")]
    InvalidId(String),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid item name {0:?}: names must be non-empty and cannot contain '/'")]
    InvalidName(String),
}
