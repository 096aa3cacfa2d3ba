//! Index query results.

use crate::document::Document;

/// The outcome of [`Collection::query`](super::Collection::query).
///
/// The shape follows the kind of the queried index.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A unique index: the matching document, if any.
    Unique(Option<Document>),
    /// A group index: every listed document, in index order.
    Group(Vec<Document>),
    /// A relation declaration. These cannot be queried by value.
    Relation,
}

impl QueryResult {
    /// All returned documents.
    #[must_use]
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            Self::Unique(document) => document.into_iter().collect(),
            Self::Group(documents) => documents,
            Self::Relation => Vec::new(),
        }
    }

    /// The first returned document.
    #[must_use]
    pub fn into_first(self) -> Option<Document> {
        self.into_documents().into_iter().next()
    }

    /// Number of returned documents.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Unique(document) => usize::from(document.is_some()),
            Self::Group(documents) => documents.len(),
            Self::Relation => 0,
        }
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
