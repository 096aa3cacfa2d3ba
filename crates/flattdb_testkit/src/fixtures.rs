//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use flattdb_core::{Config, Database};
use flattdb_storage::{InMemoryBackend, ResourceBackend};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Arc<Database>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory().expect("Failed to open in-memory database"),
            _temp_dir: None,
        }
    }

    /// Creates an in-memory test database with custom configuration.
    pub fn memory_with_config(config: Config) -> Self {
        Self::with_backend(config, Arc::new(InMemoryBackend::new()))
    }

    /// Creates a test database over a caller-supplied backend, for tests
    /// that seed or inspect raw resources.
    pub fn with_backend(config: Config, backend: Arc<dyn ResourceBackend>) -> Self {
        Self {
            db: Database::open_with_backend(config, backend)
                .expect("Failed to open database over backend"),
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test database in a temporary directory.
    pub fn file() -> Self {
        Self::file_with_config(Config::default())
    }

    /// Creates a file-based test database with custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open_with_config(temp_dir.path(), config)
            .expect("Failed to open file database");

        Self {
            db,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Arc<Database>;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust,ignore
/// use flattdb_testkit::with_temp_db;
///
/// #[test]
/// fn my_test() {
///     with_temp_db(|db| {
///         let users = db.create_collection("users", &CollectionConfig::new()).unwrap();
///         // ... test operations
///     });
/// }
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Arc<Database>) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Arc<Database>, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use flattdb_core::{CollectionConfig, DocumentId, IndexKind};

    /// Declarations of the `posts` collection used by [`blog`].
    pub fn posts_config() -> CollectionConfig {
        CollectionConfig::new()
            .index("title", &IndexKind::Unique)
            .index("tags", &IndexKind::Group)
            .index("author", &IndexKind::Collection("users".into()))
    }

    /// Creates a database with `users` (default indexes) and `posts`
    /// (`title` unique, `tags` group, `author` relating to `users`).
    pub fn blog() -> TestDatabase {
        let test_db = TestDatabase::memory();
        test_db
            .db
            .create_collection("users", &CollectionConfig::new())
            .expect("Failed to create users");
        test_db
            .db
            .create_collection("posts", &posts_config())
            .expect("Failed to create posts");
        test_db
    }

    /// Creates a database whose `users` collection holds `count` saved
    /// documents named `user_<i>`, returning their ids in creation order.
    pub fn populated_users(count: usize) -> (TestDatabase, Vec<DocumentId>) {
        let test_db = TestDatabase::memory();
        let users = test_db
            .db
            .create_collection("users", &CollectionConfig::new())
            .expect("Failed to create users");

        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let mut doc = users.create();
            doc.set("name", format!("user_{i}"));
            doc.set("tags", vec![if i % 2 == 0 { "even" } else { "odd" }]);
            doc.save().expect("Failed to save document");
            ids.push(doc.id().clone());
        }

        (test_db, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_database() {
        let test_db = TestDatabase::memory();
        assert!(test_db.collection_names().is_empty());
        assert!(test_db.path().is_none());
    }

    #[test]
    fn test_seeded_backend_database() {
        let backend = Arc::new(InMemoryBackend::new());
        backend
            .write(Path::new("notes/collection.json"), br#"{"indexes":{}}"#)
            .unwrap();
        backend.create_dir(Path::new("notes/entries")).unwrap();

        let test_db = TestDatabase::with_backend(Config::new(), backend.clone());
        let notes = test_db.collection("notes").unwrap();
        let mut note = notes.create();
        note.set("body", "hi");
        note.save().unwrap();

        let entry = format!("notes/entries/{}.json", note.id());
        assert!(backend.exists(Path::new(&entry)));
        assert_eq!(backend.resource_count(), 2);
        assert!(test_db.path().is_none());
    }

    #[test]
    fn test_memory_database_with_config() {
        let test_db = TestDatabase::memory_with_config(Config::new().pretty_json(true));
        assert!(test_db.config().pretty_json);
    }

    #[test]
    fn test_file_database() {
        with_file_db(|db, path| {
            assert_eq!(db.path(), Some(path));
            assert!(path.join("LOCK").exists());
        });
    }

    #[test]
    fn test_blog_scenario() {
        let test_db = scenarios::blog();
        assert_eq!(test_db.collection_names(), vec!["posts", "users"]);
    }

    #[test]
    fn test_populated_scenario() {
        let (test_db, ids) = scenarios::populated_users(10);
        let users = test_db.collection("users").unwrap();

        assert_eq!(users.count().unwrap(), 10);
        assert_eq!(ids.len(), 10);
        assert_eq!(users.query("tags", "even").unwrap().len(), 5);
    }
}
