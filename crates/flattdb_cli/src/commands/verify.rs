//! Verify command implementation.

use super::{open_existing, CommandResult};
use flattdb_core::{Collection, Database, RelationalId};
use std::path::Path;

/// Verification result for one collection.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of documents checked.
    pub documents_checked: usize,
    /// Number of index entries checked.
    pub entries_checked: usize,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> CommandResult {
    println!("Verifying database at {}", path.display());
    println!();

    let db = open_existing(path)?;
    let mut failed = false;
    for name in db.collection_names() {
        let collection = db.collection(&name)?;
        let result = verify_collection(&db, &collection)?;
        print_result(&name, &result);
        failed |= !result.is_ok();
    }

    println!();
    if failed {
        println!("✗ Database verification failed");
        Err("Verification failed".into())
    } else {
        println!("✓ Database verification passed");
        Ok(())
    }
}

/// Checks that every index entry names a stored document and that every
/// stored relation resolves.
pub fn verify_collection(db: &Database, collection: &Collection) -> CommandResult<VerifyResult> {
    let mut result = VerifyResult::default();

    for (name, _) in collection.indexes() {
        let Some(store) = collection.index(name) else {
            continue;
        };
        let data = match store.load() {
            Ok(Some(data)) => data,
            Ok(None) => continue,
            Err(e) => {
                result.errors.push(format!("index {name}: {e}"));
                continue;
            }
        };
        for (key, id) in data.as_index().pairs() {
            result.entries_checked += 1;
            if !collection.exists(id) {
                result
                    .errors
                    .push(format!("index {name}: key \"{key}\" lists missing document {id}"));
            }
        }
    }

    for id in collection.document_ids()? {
        result.documents_checked += 1;
        let record = match collection.read_record(&id) {
            Ok(record) => record,
            Err(e) => {
                result.errors.push(e.to_string());
                continue;
            }
        };
        for (relation, reference) in &record.related {
            if let Err(problem) = check_reference(db, reference) {
                result
                    .errors
                    .push(format!("document {id}: relation \"{relation}\": {problem}"));
            }
        }
    }

    Ok(result)
}

fn check_reference(db: &Database, reference: &str) -> Result<(), String> {
    let target = RelationalId::parse(reference).map_err(|e| e.to_string())?;
    let collection = db.collection(target.collection()).map_err(|e| e.to_string())?;
    if collection.exists(target.document()) {
        Ok(())
    } else {
        Err(format!("{reference} does not exist"))
    }
}

fn print_result(name: &str, result: &VerifyResult) {
    println!(
        "  {} documents checked: {}, index entries checked: {}, problems: {}",
        name,
        result.documents_checked,
        result.entries_checked,
        result.errors.len()
    );
    for error in &result.errors {
        println!("    ERROR: {}", error);
    }
}
