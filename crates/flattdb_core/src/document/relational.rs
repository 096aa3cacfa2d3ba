//! Relational identifiers.

use crate::document::DocumentId;
use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// Separator between collection name and document id.
pub const RELATION_SEPARATOR: char = ':';

/// The globally stable reference to a document: `<collection>:<id>`.
///
/// This is the form stored in a document's `related` map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationalId {
    collection: String,
    document: DocumentId,
}

impl RelationalId {
    /// Creates a relational id.
    #[must_use]
    pub fn new(collection: impl Into<String>, document: DocumentId) -> Self {
        Self {
            collection: collection.into(),
            document,
        }
    }

    /// The collection part.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The document part.
    #[must_use]
    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    /// Parses `<collection>:<id>`, splitting on the first separator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRelationalId` if the separator is missing or either
    /// part is empty.
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value.split_once(RELATION_SEPARATOR) {
            Some((collection, id)) if !collection.is_empty() && !id.is_empty() => {
                Ok(Self::new(collection, DocumentId::new(id)))
            }
            _ => Err(CoreError::InvalidRelationalId {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for RelationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.collection, RELATION_SEPARATOR, self.document)
    }
}

impl FromStr for RelationalId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
