//! Group index.

use super::traits::Index;
use crate::document::DocumentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps each key to the list of document ids that have it.
///
/// Ids are appended in save order and never listed twice under one key.
/// Entries are only ever added: a document that stops having a key stays
/// listed under it until the index is rebuilt.
///
/// Serialized form: `{"<key>": ["<id>", ...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupIndex {
    entries: BTreeMap<String, Vec<DocumentId>>,
}

impl GroupIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The ids listed under `key`.
    #[must_use]
    pub fn members(&self, key: &str) -> &[DocumentId] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

impl Index for GroupIndex {
    fn insert(&mut self, key: String, id: DocumentId) {
        let members = self.entries.entry(key).or_default();
        if !members.contains(&id) {
            members.push(id);
        }
    }

    fn lookup(&self, key: &str) -> Vec<DocumentId> {
        self.members(key).to_vec()
    }

    fn pairs(&self) -> Vec<(&str, &DocumentId)> {
        self.entries
            .iter()
            .flat_map(|(k, ids)| ids.iter().map(move |id| (k.as_str(), id)))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
