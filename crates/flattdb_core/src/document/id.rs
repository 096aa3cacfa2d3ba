//! Document identifier.

use super::relational::RELATION_SEPARATOR;
use crate::dir::is_valid_resource_name;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Identifier of a document within its collection.
///
/// Generated ids are 32 lowercase hex characters taken from a random
/// (v4) UUID. Ids read back from storage are kept verbatim, so documents
/// created by other tools keep whatever id they were given.
///
/// Document ids are:
/// - Unique within their collection (collisions are not detected)
/// - Immutable once assigned
/// - Used as the document's resource name
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new random document ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id can name a resource: non-empty, no path
    /// separators, no relational separator, not a dot entry.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_resource_name(&self.0) && !self.0.contains(RELATION_SEPARATOR)
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DocumentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
