//! Error types for the jotdb store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The base directory could not be created at construction time.
    #[error("cannot create base directory {}: {source}", .path.display())]
    Bootstrap {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A collection name or record id sanitized to an unusable string.
    #[error("invalid name: {raw:?} sanitizes to an empty or reserved path component")]
    InvalidName {
        /// The name as supplied by the caller.
        raw: String,
    },

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record could not be serialized before writing.
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// On-disk content failed to deserialize. This indicates corruption,
    /// not a missing record.
    #[error("corrupt record {id} in collection {collection}: {source}")]
    Corrupt {
        /// The collection holding the corrupt file.
        collection: String,
        /// The record id.
        id: String,
        /// The decode error.
        source: serde_json::Error,
    },

    /// A record required by the operation does not exist.
    #[error("record not found: {id} in collection {collection}")]
    RecordNotFound {
        /// The collection searched.
        collection: String,
        /// The record id that was not found.
        id: String,
    },

    /// A collection required by the operation does not exist.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the collection.
        name: String,
    },

    /// `append` was invoked against a field that exists but is not an array.
    #[error("field {field:?} is not an array and cannot be appended to")]
    FieldNotAppendable {
        /// The offending field name.
        field: String,
    },

    /// A checked update found the record modified since it was read.
    #[error("write conflict: record {id} in collection {collection} was modified concurrently")]
    WriteConflict {
        /// The collection holding the record.
        collection: String,
        /// The record id.
        id: String,
    },
}

impl StoreError {
    /// Creates an invalid name error.
    pub fn invalid_name(raw: impl Into<String>) -> Self {
        Self::InvalidName { raw: raw.into() }
    }

    /// Creates a corrupt record error.
    pub fn corrupt(
        collection: impl Into<String>,
        id: impl Into<String>,
        source: serde_json::Error,
    ) -> Self {
        Self::Corrupt {
            collection: collection.into(),
            id: id.into(),
            source,
        }
    }

    /// Creates a record not found error.
    pub fn record_not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a collection not found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Creates a field not appendable error.
    pub fn field_not_appendable(field: impl Into<String>) -> Self {
        Self::FieldNotAppendable {
            field: field.into(),
        }
    }

    /// Creates a write conflict error.
    pub fn write_conflict(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::WriteConflict {
            collection: collection.into(),
            id: id.into(),
        }
    }
}
