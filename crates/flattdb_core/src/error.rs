//! Error types for FlattDB core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in FlattDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] flattdb_storage::StorageError),

    /// JSON codec error.
    #[error("codec error: {0}")]
    Codec(#[from] flattdb_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A collection's configuration is invalid: unknown model, unknown
    /// index type, missing index resource, or an undeclared index queried.
    #[error("configuration error in collection \"{collection}\": {message}")]
    Configuration {
        /// The collection whose configuration is at fault.
        collection: String,
        /// Description of the problem.
        message: String,
    },

    /// Document not found.
    #[error("document \"{id}\" not found in collection \"{collection}\"")]
    DocumentNotFound {
        /// The collection searched.
        collection: String,
        /// The document ID that was not found.
        id: String,
    },

    /// Collection not found.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the collection.
        name: String,
    },

    /// A relation name that was never set on the document.
    #[error("document \"{id}\" has no relation named \"{name}\"")]
    RelationNotFound {
        /// The document that was asked.
        id: String,
        /// The relation name.
        name: String,
    },

    /// A stored relation reference is not of the form `collection:id`.
    #[error("invalid relational id: \"{value}\"")]
    InvalidRelationalId {
        /// The offending reference.
        value: String,
    },

    /// Following relations led back to a document already on the path.
    #[error("relation cycle through {relational_id}")]
    RelationCycle {
        /// The relational id that was reached twice.
        relational_id: String,
    },

    /// One save reached two copies of the same document holding
    /// different data or relations.
    #[error("conflicting copies of {relational_id} in one save")]
    ConflictingCopies {
        /// The relational id held by both copies.
        relational_id: String,
    },

    /// A stored resource does not have the expected shape.
    #[error("invalid format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The collection's document model rejected a document.
    #[error("invalid document \"{id}\": {message}")]
    InvalidDocument {
        /// The rejected document.
        id: String,
        /// Reason given by the model.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// Database is already open or locked.
    #[error("database locked: another process has exclusive access")]
    DatabaseLocked,

    /// The database behind a collection has been dropped.
    #[error("database is closed")]
    DatabaseClosed,
}

impl CoreError {
    /// Creates a configuration error.
    pub fn configuration(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates a document not found error.
    pub fn document_not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DocumentNotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a collection not found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid document error.
    pub fn invalid_document(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for the not-found family (document or collection).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DocumentNotFound { .. } | Self::CollectionNotFound { .. }
        )
    }

    /// Returns true for configuration errors.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_collection() {
        let err = CoreError::configuration("users", "missing index \"name\"");
        assert_eq!(
            err.to_string(),
            "configuration error in collection \"users\": missing index \"name\""
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn not_found_family() {
        assert!(CoreError::document_not_found("users", "abc").is_not_found());
        assert!(CoreError::collection_not_found("ghosts").is_not_found());
        assert!(!CoreError::DatabaseClosed.is_not_found());
    }

    #[test]
    fn storage_errors_convert() {
        let err: CoreError = flattdb_storage::StorageError::not_found("x.json").into();
        assert!(matches!(err, CoreError::Storage(_)));
    }
}
