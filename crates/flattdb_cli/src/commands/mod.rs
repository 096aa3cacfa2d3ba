//! CLI command implementations.

pub mod create_collection;
pub mod fetch;
pub mod inspect;
pub mod query;
pub mod reindex;
pub mod verify;

use flattdb_core::{Config, Database, Document, Fields};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Result type shared by the commands.
pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Configuration the commands open databases with.
///
/// Models belong to the programs that use a database, so collections
/// naming a model unknown here still open.
pub fn cli_config() -> Config {
    Config::new().allow_unregistered_models(true)
}

/// Opens an existing database directory.
pub fn open_existing(path: &Path) -> CommandResult<Arc<Database>> {
    let config = cli_config().create_if_missing(false);
    Ok(Database::open_with_config(path, config)?)
}

/// A document with its relations expanded, as printed by `fetch` and
/// `query`.
#[derive(Debug, Serialize)]
pub struct DocumentView<'a> {
    /// Document id.
    pub id: &'a str,
    /// Owning collection.
    pub collection: &'a str,
    /// Field data.
    pub data: &'a Fields,
    /// Related documents by relation name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub related: BTreeMap<&'a str, DocumentView<'a>>,
}

impl<'a> DocumentView<'a> {
    /// Builds the view of `document` and everything it relates to.
    pub fn new(document: &'a Document) -> Self {
        Self {
            id: document.id().as_str(),
            collection: document.collection().name(),
            data: document.get_all(),
            related: document
                .related()
                .map(|(name, related)| (name, DocumentView::new(related)))
                .collect(),
        }
    }
}
