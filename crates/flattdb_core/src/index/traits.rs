//! The index trait.

use crate::document::DocumentId;

/// Operations shared by the persisted index types.
///
/// Keys are the strings produced by [`index_keys`](super::index_keys).
pub trait Index: Send + Sync {
    /// Records that `id` has `key`.
    fn insert(&mut self, key: String, id: DocumentId);

    /// Ids recorded under `key`, in insertion order.
    fn lookup(&self, key: &str) -> Vec<DocumentId>;

    /// Every `(key, id)` pair held by the index.
    fn pairs(&self) -> Vec<(&str, &DocumentId)>;

    /// Returns the number of distinct keys.
    fn len(&self) -> usize;

    /// Returns true if the index has no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
