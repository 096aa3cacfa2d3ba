//! Index declaration kinds.

use std::fmt;

const UNIQUE: &str = "unique";
const GROUP: &str = "group";
const COLLECTION_PREFIX: &str = "collection:";

/// The kind of a declared index, as written in `collection.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// `"unique"`: one document id per key.
    Unique,
    /// `"group"`: a list of document ids per key.
    Group,
    /// `"collection:<target>"`: the field relates to documents of the
    /// named collection.
    Collection(String),
}

impl IndexKind {
    /// Parses a declaration string. Returns `None` for anything that is
    /// not `unique`, `group` or `collection:<non-empty target>`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            UNIQUE => Some(Self::Unique),
            GROUP => Some(Self::Group),
            other => other
                .strip_prefix(COLLECTION_PREFIX)
                .filter(|target| !target.is_empty())
                .map(|target| Self::Collection(target.to_string())),
        }
    }

    /// Returns true if this kind only declares a relation.
    #[must_use]
    pub fn is_relation(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// The related collection, for `collection:` kinds.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Collection(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unique => f.write_str(UNIQUE),
            Self::Group => f.write_str(GROUP),
            Self::Collection(target) => write!(f, "{COLLECTION_PREFIX}{target}"),
        }
    }
}
