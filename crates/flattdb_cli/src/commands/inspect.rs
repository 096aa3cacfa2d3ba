//! Inspect command implementation.

use super::{open_existing, CommandResult};
use flattdb_core::Collection;
use serde::Serialize;
use std::path::Path;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Database path.
    pub path: String,
    /// Total number of stored documents.
    pub document_count: usize,
    /// Per-collection details.
    pub collections: Vec<CollectionStats>,
}

/// Details of a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Resolved model name.
    pub model: String,
    /// Number of stored documents.
    pub document_count: usize,
    /// Declared indexes.
    pub indexes: Vec<IndexStats>,
}

/// Details of a single index.
#[derive(Debug, Serialize)]
pub struct IndexStats {
    /// Index name.
    pub name: String,
    /// Declared kind.
    pub kind: String,
    /// Number of distinct keys; absent for relation declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<usize>,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> CommandResult {
    let result = inspect(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Gathers the inspection report for the database at `path`.
pub fn inspect(path: &Path) -> CommandResult<InspectResult> {
    let db = open_existing(path)?;

    let mut result = InspectResult {
        path: path.display().to_string(),
        document_count: 0,
        collections: Vec::new(),
    };
    for name in db.collection_names() {
        let collection = db.collection(&name)?;
        let stats = collection_stats(&collection)?;
        result.document_count += stats.document_count;
        result.collections.push(stats);
    }
    Ok(result)
}

fn collection_stats(collection: &Collection) -> CommandResult<CollectionStats> {
    let mut indexes = Vec::new();
    for (name, kind) in collection.indexes() {
        let keys = match collection.index(name) {
            Some(store) => store.load()?.map(|data| data.as_index().len()),
            None => None,
        };
        indexes.push(IndexStats {
            name: name.to_string(),
            kind: kind.to_string(),
            keys,
        });
    }

    Ok(CollectionStats {
        name: collection.name().to_string(),
        model: collection.model_name().to_string(),
        document_count: collection.count()?,
        indexes,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("FlattDB Database Inspection");
    println!("===========================");
    println!();
    println!("Path:        {}", result.path);
    println!("Collections: {}", result.collections.len());
    println!("Documents:   {}", result.document_count);

    for collection in &result.collections {
        println!();
        println!("{} (model: {})", collection.name, collection.model);
        println!("  Documents: {}", collection.document_count);
        if collection.indexes.is_empty() {
            println!("  Indexes:   none");
        }
        for index in &collection.indexes {
            match index.keys {
                Some(keys) => println!("  {:<12} {:<20} {} keys", index.name, index.kind, keys),
                None => println!("  {:<12} {}", index.name, index.kind),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_collection;
    use flattdb_core::{CollectionConfig, Config, Database, DocumentModel, IndexKind};

    struct Member;

    impl DocumentModel for Member {
        fn name(&self) -> &str {
            "member"
        }
    }

    #[test]
    fn reports_collections_and_indexes() {
        let temp = tempfile::tempdir().unwrap();
        {
            let db = Database::open(temp.path()).unwrap();
            let users = db.create_collection("users", &CollectionConfig::new()).unwrap();
            db.create_collection(
                "posts",
                &CollectionConfig::new().index("author", &IndexKind::Collection("users".into())),
            )
            .unwrap();
            for name in ["alice", "bob"] {
                let mut user = users.create();
                user.set("name", name);
                user.save().unwrap();
            }
        }

        let result = inspect(temp.path()).unwrap();
        assert_eq!(result.document_count, 2);
        let names: Vec<_> = result.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["posts", "users"]);

        let users = &result.collections[1];
        assert_eq!(users.model, "default");
        assert_eq!(users.indexes[0].name, "name");
        assert_eq!(users.indexes[0].keys, Some(2));
        assert_eq!(result.collections[0].indexes[0].keys, None);

        run(temp.path(), "json").unwrap();
        run(temp.path(), "text").unwrap();
    }

    #[test]
    fn opens_collections_with_models_it_does_not_know() {
        let temp = tempfile::tempdir().unwrap();
        {
            let config = Config::new().with_model(Member);
            let db = Database::open_with_config(temp.path(), config).unwrap();
            let members = db
                .create_collection("members", &CollectionConfig::new().model("member"))
                .unwrap();
            let mut member = members.create();
            member.set("name", "carol");
            member.save().unwrap();
        }

        let result = inspect(temp.path()).unwrap();
        assert_eq!(result.collections[0].model, "member");
        assert_eq!(result.collections[0].document_count, 1);
    }

    #[test]
    fn model_flag_provisions_for_another_program() {
        let temp = tempfile::tempdir().unwrap();
        create_collection::run(temp.path(), "members", &[], Some("member")).unwrap();

        let settings = std::fs::read_to_string(temp.path().join("members/collection.json")).unwrap();
        assert!(settings.contains("\"member\""));

        let config = Config::new().with_model(Member);
        let db = Database::open_with_config(temp.path(), config).unwrap();
        assert_eq!(db.collection("members").unwrap().model_name(), "member");
    }
}
