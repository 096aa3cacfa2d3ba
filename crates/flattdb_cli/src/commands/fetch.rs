//! Fetch command implementation.

use super::{open_existing, CommandResult, DocumentView};
use std::path::Path;

/// Runs the fetch command.
pub fn run(path: &Path, collection: &str, id: &str) -> CommandResult {
    let db = open_existing(path)?;
    let document = db.collection(collection)?.fetch(id)?;
    println!("{}", serde_json::to_string_pretty(&DocumentView::new(&document))?);
    Ok(())
}
