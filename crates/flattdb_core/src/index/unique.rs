//! Unique index.

use super::traits::Index;
use crate::document::DocumentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps each key to exactly one document id.
///
/// Inserting a key that is already present replaces its id; there is no
/// uniqueness enforcement, the most recent save wins.
///
/// Serialized form: `{"<key>": "<document id>", ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueIndex {
    entries: BTreeMap<String, DocumentId>,
}

impl UniqueIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DocumentId> {
        self.entries.get(key)
    }
}

impl Index for UniqueIndex {
    fn insert(&mut self, key: String, id: DocumentId) {
        self.entries.insert(key, id);
    }

    fn lookup(&self, key: &str) -> Vec<DocumentId> {
        self.entries.get(key).cloned().into_iter().collect()
    }

    fn pairs(&self) -> Vec<(&str, &DocumentId)> {
        self.entries.iter().map(|(k, id)| (k.as_str(), id)).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut index = UniqueIndex::new();
        index.insert("alice".into(), DocumentId::new("a1"));

        assert_eq!(index.get("alice"), Some(&DocumentId::new("a1")));
        assert_eq!(index.lookup("alice"), vec![DocumentId::new("a1")]);
        assert!(index.lookup("bob").is_empty());
    }

    #[test]
    fn last_write_wins() {
        let mut index = UniqueIndex::new();
        index.insert("alice".into(), DocumentId::new("a1"));
        index.insert("alice".into(), DocumentId::new("a2"));

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("alice"), Some(&DocumentId::new("a2")));
    }

    #[test]
    fn new_is_empty() {
        let index = UniqueIndex::new();
        assert!(index.is_empty());
        assert!(index.pairs().is_empty());
    }

    #[test]
    fn serialized_shape() {
        let mut index = UniqueIndex::new();
        index.insert("alice".into(), DocumentId::new("a1"));

        let json = flattdb_codec::to_json(&index).unwrap();
        assert_eq!(json, br#"{"alice":"a1"}"#);
    }
}
