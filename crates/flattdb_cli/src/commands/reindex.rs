//! Reindex command implementation.

use super::{open_existing, CommandResult};
use std::path::Path;
use tracing::info;

/// Runs the reindex command.
pub fn run(path: &Path, collection: &str) -> CommandResult {
    let db = open_existing(path)?;
    let collection = db.collection(collection)?;

    info!(collection = %collection.name(), "rebuilding indexes");
    let documents = collection.rebuild_indexes()?;
    println!(
        "Rebuilt {} index(es) of {} from {} document(s)",
        collection.indexes().filter(|(_, kind)| !kind.is_relation()).count(),
        collection.name(),
        documents
    );
    Ok(())
}
