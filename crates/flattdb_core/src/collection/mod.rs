//! Collections of documents.
//!
//! A collection is a directory holding `collection.json`, one resource per
//! declared index under `indexes/`, and one resource per document under
//! `entries/`.

#[allow(clippy::module_inception)]
mod collection;
mod config;
mod query;

pub use collection::Collection;
pub(crate) use collection::is_valid_collection_name;
pub use config::{default_indexes, CollectionConfig};
pub use query::QueryResult;

use crate::error::CoreResult;
use std::sync::Arc;

/// Resolves collection names to open collections.
///
/// Collections follow relations into other collections through this
/// trait; the database implements it.
pub trait CollectionLookup: Send + Sync {
    /// Returns the collection named `name`.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` if there is no such collection.
    fn collection(&self, name: &str) -> CoreResult<Arc<Collection>>;
}
