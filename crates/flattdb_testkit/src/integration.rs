//! Cross-crate integration test helpers.
//!
//! Provides utilities for testing interactions between
//! multiple FlattDB crates.

use flattdb_codec::Fields;
use flattdb_core::{Database, Document, DocumentId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A test harness for integration testing.
///
/// Remembers the field data of every document it saves so fetches can be
/// checked against it.
pub struct IntegrationHarness {
    /// The database instance.
    pub db: Arc<Database>,
    /// Saved field data by (collection, id).
    saved: HashMap<(String, DocumentId), Fields>,
}

impl IntegrationHarness {
    /// Creates a new integration harness with an in-memory database.
    pub fn new() -> Self {
        Self::with_database(Database::open_in_memory().expect("Failed to open database"))
    }

    /// Creates a harness around an existing database.
    pub fn with_database(db: Arc<Database>) -> Self {
        Self {
            db,
            saved: HashMap::new(),
        }
    }

    /// Saves a document (and its relations) and tracks their data.
    pub fn save(&mut self, document: &Document) {
        document.save().expect("Failed to save document");
        self.track(document);
    }

    fn track(&mut self, document: &Document) {
        for (_, related) in document.related() {
            self.track(related);
        }
        self.saved.insert(
            (document.collection().name().to_string(), document.id().clone()),
            document.get_all().clone(),
        );
    }

    /// Fetches a document and checks its data matches what was saved.
    pub fn fetch_and_verify(&self, collection: &str, id: &DocumentId) -> Document {
        let document = self
            .db
            .collection(collection)
            .expect("Unknown collection")
            .fetch(id)
            .expect("Failed to fetch document");

        if let Some(expected) = self.saved.get(&(collection.to_string(), id.clone())) {
            assert_eq!(
                document.get_all(),
                expected,
                "Document data mismatch for {collection}:{id}"
            );
        }
        document
    }

    /// Verifies every tracked document.
    pub fn verify_all(&self) {
        for (collection, id) in self.saved.keys() {
            self.fetch_and_verify(collection, id);
        }
    }

    /// Number of tracked documents.
    pub fn tracked_count(&self) -> usize {
        self.saved.len()
    }

    /// Reads a raw resource as JSON.
    pub fn raw_json(&self, path: &str) -> serde_json::Value {
        let bytes = self
            .db
            .backend()
            .read(Path::new(path))
            .expect("Failed to read resource");
        serde_json::from_slice(&bytes).expect("Resource is not JSON")
    }
}

impl Default for IntegrationHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{scenarios, TestDatabase};
    use crate::generators::{fields_strategy, key_strategy, tags_strategy};
    use flattdb_core::{CollectionConfig, CoreError, IndexKind, QueryResult, Value};
    use proptest::prelude::*;

    #[test]
    fn end_to_end_users() {
        let test_db = TestDatabase::file();
        let users = test_db
            .create_collection("users", &CollectionConfig::new())
            .unwrap();

        let mut doc = users.create();
        doc.set("name", "alice");
        doc.set("tags", vec!["admin", "staff"]);
        doc.save().unwrap();

        let found = users.query("name", "alice").unwrap().into_first().unwrap();
        assert_eq!(found.id(), doc.id());
        assert_eq!(found.get("name"), Some(&Value::from("alice")));

        let admins = users.query("tags", "admin").unwrap().into_documents();
        assert!(admins.iter().any(|d| d.id() == doc.id()));

        let path = test_db.path().unwrap();
        let entry = std::fs::read(path.join(format!("users/entries/{}.json", doc.id()))).unwrap();
        let entry: serde_json::Value = serde_json::from_slice(&entry).unwrap();
        assert_eq!(entry["data"]["name"], "alice");
        assert!(entry["related"].as_object().unwrap().is_empty());
    }

    #[test]
    fn floats_fetch_back_bit_for_bit() {
        let test_db = TestDatabase::file();
        let users = test_db
            .create_collection("users", &CollectionConfig::new())
            .unwrap();
        let mut harness = IntegrationHarness::with_database(Arc::clone(&test_db.db));

        let mut doc = users.create();
        doc.set("a", vec![-953_203_817_739.103_3]);
        doc.set("b", -211_397_323_287.326_54);
        doc.set("c", f64::MIN_POSITIVE);
        harness.save(&doc);

        let fetched = harness.fetch_and_verify("users", doc.id());
        assert_eq!(fetched.get("b"), Some(&Value::Float(-211_397_323_287.326_54)));
    }

    #[test]
    fn non_finite_float_is_rejected_not_nulled() {
        let test_db = TestDatabase::memory();
        let users = test_db
            .create_collection("users", &CollectionConfig::new())
            .unwrap();

        let mut doc = users.create();
        doc.set("score", f64::NAN);

        assert!(matches!(doc.save(), Err(CoreError::InvalidDocument { .. })));
        assert!(!users.exists(doc.id()));
    }

    #[test]
    fn blog_relations_round_trip() {
        let test_db = scenarios::blog();
        let mut harness = IntegrationHarness::with_database(Arc::clone(&test_db.db));
        let users = test_db.collection("users").unwrap();
        let posts = test_db.collection("posts").unwrap();

        let mut author = users.create();
        author.set("name", "alice");
        let mut post = posts.create();
        post.set("title", "Hello");
        post.set("tags", vec!["intro", "news"]);
        post.set_related("author", author.clone());
        harness.save(&post);

        assert_eq!(harness.tracked_count(), 2);
        harness.verify_all();

        let fetched = harness.fetch_and_verify("posts", post.id());
        assert_eq!(fetched.get_related("author").unwrap().id(), author.id());

        let stored = harness.raw_json(&format!("posts/entries/{}.json", post.id()));
        assert_eq!(stored["related"]["author"], format!("users:{}", author.id()));
        let titles = harness.raw_json("posts/indexes/title.json");
        assert_eq!(titles["Hello"], post.id().as_str());
        assert!(matches!(
            posts.query("author", author.id().as_str()).unwrap(),
            QueryResult::Relation
        ));
    }

    #[test]
    fn undeclared_index_and_missing_documents() {
        let test_db = scenarios::blog();
        let posts = test_db.collection("posts").unwrap();

        assert!(posts.query("body", "x").unwrap_err().is_configuration());
        assert!(matches!(
            posts.fetch("does-not-exist"),
            Err(CoreError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn missing_index_resource_fails_open() {
        let test_db = TestDatabase::file_with_config(flattdb_core::Config::new());
        let path = test_db.path().unwrap().to_path_buf();
        test_db
            .create_collection("users", &CollectionConfig::new())
            .unwrap();
        std::fs::remove_file(path.join("users/indexes/tags.json")).unwrap();

        let err = test_db.load_collections().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("missing index \"tags\""));
    }

    #[test]
    fn reopened_database_sees_saved_state() {
        let test_db = TestDatabase::file_with_config(flattdb_core::Config::new().exclusive_lock(false));
        let path = test_db.path().unwrap();
        let users = test_db
            .create_collection("users", &CollectionConfig::new().index("email", &IndexKind::Unique))
            .unwrap();
        let mut doc = users.create();
        doc.set("email", "a@example.com");
        doc.save().unwrap();

        let config = flattdb_core::Config::new()
            .exclusive_lock(false)
            .create_if_missing(false);
        let reopened = Database::open_with_config(path, config).unwrap();
        let found = reopened
            .collection("users")
            .unwrap()
            .query("email", "a@example.com")
            .unwrap()
            .into_first()
            .unwrap();
        assert_eq!(found.id(), doc.id());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn saved_fields_fetch_back_unchanged(fields in fields_strategy()) {
            let test_db = TestDatabase::memory();
            let notes = test_db
                .create_collection("notes", &CollectionConfig::new().index("n", &IndexKind::Group))
                .unwrap();

            let mut doc = notes.create();
            doc.set_all(fields.clone());
            doc.save().unwrap();

            let fetched = notes.fetch(doc.id()).unwrap();
            prop_assert_eq!(fetched.get_all(), &fields);
        }

        #[test]
        fn unique_index_keeps_latest(names in prop::collection::vec(key_strategy(), 1..8)) {
            let test_db = TestDatabase::memory();
            let users = test_db.create_collection("users", &CollectionConfig::new()).unwrap();

            let mut latest = std::collections::HashMap::new();
            for name in &names {
                let mut doc = users.create();
                doc.set("name", name.as_str());
                doc.save().unwrap();
                latest.insert(name.clone(), doc.id().clone());
            }

            for (name, id) in &latest {
                let found = users.query("name", name.as_str()).unwrap().into_first().unwrap();
                prop_assert_eq!(found.id(), id);
            }
        }

        #[test]
        fn group_index_lists_every_tag(tags in tags_strategy()) {
            let test_db = TestDatabase::memory();
            let users = test_db.create_collection("users", &CollectionConfig::new()).unwrap();

            let mut doc = users.create();
            doc.set("tags", tags.clone());
            doc.save().unwrap();
            doc.save().unwrap();

            for tag in &tags {
                let members = users.query("tags", tag.as_str()).unwrap().into_documents();
                prop_assert_eq!(members.len(), 1);
                prop_assert_eq!(members[0].id(), doc.id());
            }
        }
    }
}
