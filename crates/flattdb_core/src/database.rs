//! Database facade.

use crate::collection::{
    is_valid_collection_name, Collection, CollectionConfig, CollectionLookup,
};
use crate::config::Config;
use crate::dir::{CollectionLayout, DatabaseDir};
use crate::error::{CoreError, CoreResult};
use flattdb_codec::to_json_pretty;
use flattdb_storage::{FileBackend, InMemoryBackend, ResourceBackend};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// The main database handle.
///
/// A database is a directory of collections. Opening it discovers every
/// collection; collections then find each other through the database when
/// they follow relations.
///
/// # Example
///
/// ```rust,ignore
/// use flattdb_core::Database;
/// use std::path::Path;
///
/// let db = Database::open(Path::new("data"))?;
/// let users = db.collection("users")?;
///
/// let mut alice = users.create();
/// alice.set("name", "alice");
/// alice.save()?;
///
/// let found = users.query("name", "alice")?.into_first();
/// ```
pub struct Database {
    config: Config,
    /// Directory handle holding the lock. `None` for custom backends.
    dir: Option<DatabaseDir>,
    backend: Arc<dyn ResourceBackend>,
    collections: RwLock<BTreeMap<String, Arc<Collection>>>,
}

impl Database {
    /// Opens a database directory with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another process has the database locked (`DatabaseLocked`)
    /// - A collection's configuration is invalid (`Configuration`)
    /// - I/O errors occur
    pub fn open(path: &Path) -> CoreResult<Arc<Self>> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a database directory with custom configuration.
    ///
    /// # Errors
    ///
    /// See [`Database::open`]. Also fails if the directory is missing and
    /// `create_if_missing` is off.
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Arc<Self>> {
        let dir = DatabaseDir::open(path, config.create_if_missing, config.exclusive_lock)?;
        let backend = FileBackend::open(dir.path())?.sync_writes(config.sync_writes);
        Self::build(config, Some(dir), Arc::new(backend))
    }

    /// Opens a database over an arbitrary backend.
    ///
    /// # Errors
    ///
    /// Fails if a stored collection cannot be opened.
    pub fn open_with_backend(
        config: Config,
        backend: Arc<dyn ResourceBackend>,
    ) -> CoreResult<Arc<Self>> {
        Self::build(config, None, backend)
    }

    /// Opens a fresh, empty in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other
    /// constructors.
    pub fn open_in_memory() -> CoreResult<Arc<Self>> {
        Self::open_with_backend(Config::default(), Arc::new(InMemoryBackend::new()))
    }

    fn build(
        config: Config,
        dir: Option<DatabaseDir>,
        backend: Arc<dyn ResourceBackend>,
    ) -> CoreResult<Arc<Self>> {
        let db = Arc::new(Self {
            config,
            dir,
            backend,
            collections: RwLock::new(BTreeMap::new()),
        });
        db.load_collections()?;
        Ok(db)
    }

    /// Rescans the root for collections and replaces the open set.
    ///
    /// Every child directory holding a `collection.json` is opened;
    /// anything else is skipped. Returns the number of collections found.
    ///
    /// # Errors
    ///
    /// Fails if any collection cannot be opened or a `collection:` index
    /// names a collection that does not exist.
    pub fn load_collections(self: &Arc<Self>) -> CoreResult<usize> {
        let mut found = BTreeMap::new();
        for entry in self.backend.list(Path::new(""))? {
            let layout = CollectionLayout::new(&entry);
            if !self.backend.is_dir(layout.root()) {
                continue;
            }
            if !is_valid_collection_name(&entry) || !self.backend.exists(&layout.config_path()) {
                debug!(entry = %entry, "skipping non-collection directory");
                continue;
            }
            let collection = Collection::open(
                &entry,
                Arc::clone(&self.backend),
                self.lookup(),
                &self.config,
            )?;
            found.insert(entry, Arc::new(collection));
        }

        for collection in found.values() {
            for target in collection.relation_targets() {
                if !found.contains_key(target) {
                    return Err(CoreError::configuration(
                        collection.name(),
                        format!("relation target \"{target}\" does not exist"),
                    ));
                }
            }
        }

        let count = found.len();
        *self.collections.write() = found;
        info!(collections = count, path = ?self.path(), "loaded collections");
        Ok(count)
    }

    /// Returns the collection named `name`.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` if there is no such collection.
    pub fn collection(&self, name: &str) -> CoreResult<Arc<Collection>> {
        let name = name.trim_matches(['/', '\\']);
        self.collections
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::collection_not_found(name))
    }

    /// Names of all open collections, sorted.
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    /// Provisions a new collection and opens it.
    ///
    /// Writes `collection.json`, an empty `{}` resource for every declared
    /// index and the `entries/` directory.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if the collection already exists
    /// - `Configuration` for an invalid name, model, index type or relation
    ///   target
    pub fn create_collection(
        self: &Arc<Self>,
        name: &str,
        settings: &CollectionConfig,
    ) -> CoreResult<Arc<Collection>> {
        let name = name.trim_matches(['/', '\\']);
        if !is_valid_collection_name(name) {
            return Err(CoreError::configuration(name, "invalid collection name"));
        }
        let layout = CollectionLayout::new(name);
        if self.collections.read().contains_key(name) || self.backend.exists(layout.root()) {
            return Err(CoreError::invalid_operation(format!(
                "collection \"{name}\" already exists"
            )));
        }

        self.config.models.resolve(name, settings.model.as_deref())?;
        let kinds = settings.index_kinds(name)?;
        for target in kinds.values().filter_map(|kind| kind.target()) {
            if target != name && !self.collections.read().contains_key(target) {
                return Err(CoreError::configuration(
                    name,
                    format!("relation target \"{target}\" does not exist"),
                ));
            }
        }

        self.backend
            .write(&layout.config_path(), &to_json_pretty(settings)?)?;
        for index in kinds.keys() {
            self.backend.write(&layout.index_path(index), b"{}")?;
        }
        self.backend.create_dir(&layout.entries_dir())?;

        let collection = Arc::new(Collection::open(
            name,
            Arc::clone(&self.backend),
            self.lookup(),
            &self.config,
        )?);
        self.collections
            .write()
            .insert(name.to_string(), Arc::clone(&collection));
        info!(collection = %name, indexes = kinds.len(), "created collection");
        Ok(collection)
    }

    /// Root directory, for file-backed databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(DatabaseDir::path)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The storage backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn ResourceBackend> {
        &self.backend
    }

    fn lookup(self: &Arc<Self>) -> Weak<dyn CollectionLookup> {
        let weak: Weak<Self> = Arc::downgrade(self);
        weak as Weak<dyn CollectionLookup>
    }
}

impl CollectionLookup for Database {
    fn collection(&self, name: &str) -> CoreResult<Arc<Collection>> {
        Database::collection(self, name)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path())
            .field("collections", &self.collection_names())
            .finish_non_exhaustive()
    }
}
