//! Create-collection command implementation.

use super::{cli_config, CommandResult};
use flattdb_core::{CollectionConfig, Database, IndexKind};
use std::path::Path;
use tracing::info;

/// Runs the create-collection command.
///
/// With no `--index` flags the collection gets the default `name` and
/// `tags` indexes. `--model` records the model name for the program that
/// registers it; it need not be known here.
pub fn run(path: &Path, name: &str, indexes: &[String], model: Option<&str>) -> CommandResult {
    let settings = build_settings(indexes, model)?;
    let db = Database::open_with_config(path, cli_config())?;

    let collection = db.create_collection(name, &settings)?;
    info!(collection = %collection.name(), "collection ready");
    println!("Created collection {}", collection.name());
    for (index, kind) in collection.indexes() {
        println!("  {index}: {kind}");
    }
    Ok(())
}

fn build_settings(indexes: &[String], model: Option<&str>) -> CommandResult<CollectionConfig> {
    let mut settings = CollectionConfig::new();
    if let Some(model) = model {
        settings = settings.model(model);
    }
    for declaration in indexes {
        let (index, raw) = declaration
            .split_once('=')
            .ok_or_else(|| format!("expected name=kind, got \"{declaration}\""))?;
        let kind =
            IndexKind::parse(raw).ok_or_else(|| format!("unknown index type \"{raw}\""))?;
        settings = settings.index(index, &kind);
    }
    Ok(settings)
}
