//! Query command implementation.

use super::{open_existing, CommandResult, DocumentView};
use flattdb_core::QueryResult;
use std::path::Path;

/// Runs the query command.
///
/// Index keys are strings, so `value` is looked up as given: `30` finds
/// documents whose field is the number 30 or the text "30".
pub fn run(path: &Path, collection: &str, index: &str, value: &str) -> CommandResult {
    let db = open_existing(path)?;
    let result = db.collection(collection)?.query(index, value)?;

    if matches!(result, QueryResult::Relation) {
        return Err(format!("index \"{index}\" declares a relation and cannot be queried").into());
    }

    let documents = result.into_documents();
    let views: Vec<_> = documents.iter().map(DocumentView::new).collect();
    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}
