//! Collection implementation.

use super::config::CollectionConfig;
use super::query::QueryResult;
use super::CollectionLookup;
use crate::config::Config;
use crate::dir::{resource_stem, CollectionLayout};
use crate::document::{Document, DocumentId, DocumentRecord, RelationalId};
use crate::error::{CoreError, CoreResult};
use crate::index::{empty_indexes, index_keys, IndexKind, IndexStore};
use crate::model::DocumentModel;
use flattdb_codec::{from_json_or_default, Value};
use flattdb_storage::ResourceBackend;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace};

/// A named set of documents with its declared indexes.
///
/// Collections are opened by the [`Database`](crate::Database) and shared
/// as `Arc<Collection>`. Relations are resolved through the database, so a
/// collection outliving its database can still read its own documents but
/// fails with `DatabaseClosed` when it has to follow a relation.
pub struct Collection {
    name: String,
    layout: CollectionLayout,
    backend: Arc<dyn ResourceBackend>,
    lookup: Weak<dyn CollectionLookup>,
    model: Arc<dyn DocumentModel>,
    indexes: BTreeMap<String, IndexStore>,
    pretty_json: bool,
}

impl Collection {
    /// Opens the collection stored under `name`.
    ///
    /// Leading and trailing path separators in `name` are ignored.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `collection.json` is missing or
    /// malformed, names an unregistered model, declares an unknown index
    /// type, or declares an index with no backing resource.
    pub fn open(
        name: &str,
        backend: Arc<dyn ResourceBackend>,
        lookup: Weak<dyn CollectionLookup>,
        config: &Config,
    ) -> CoreResult<Self> {
        let name = name.trim_matches(['/', '\\']);
        if !is_valid_collection_name(name) {
            return Err(CoreError::configuration(name, "invalid collection name"));
        }
        let layout = CollectionLayout::new(name);

        let settings = read_settings(name, &layout, backend.as_ref())?;
        let model = config.models.resolve(name, settings.model.as_deref())?;
        let kinds = settings.index_kinds(name)?;

        let present = match backend.list(&layout.indexes_dir()) {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let mut indexes = BTreeMap::new();
        for (index, kind) in kinds {
            if !present.iter().any(|entry| resource_stem(entry) == Some(index.as_str())) {
                return Err(CoreError::configuration(
                    name,
                    format!("missing index \"{index}\""),
                ));
            }
            let store = IndexStore::new(
                index.clone(),
                kind,
                layout.index_path(&index),
                Arc::clone(&backend),
                config.pretty_json,
            );
            indexes.insert(index, store);
        }

        debug!(
            collection = %name,
            model = %model.name(),
            indexes = indexes.len(),
            "opened collection"
        );

        Ok(Self {
            name: name.to_string(),
            layout,
            backend,
            lookup,
            model,
            indexes,
            pretty_json: config.pretty_json,
        })
    }

    /// The collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource paths of this collection.
    #[must_use]
    pub fn layout(&self) -> &CollectionLayout {
        &self.layout
    }

    /// The resolved document model.
    #[must_use]
    pub fn model(&self) -> &Arc<dyn DocumentModel> {
        &self.model
    }

    /// Name of the resolved document model.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Declared indexes and their kinds, in name order.
    pub fn indexes(&self) -> impl Iterator<Item = (&str, &IndexKind)> {
        self.indexes
            .iter()
            .map(|(name, store)| (name.as_str(), store.kind()))
    }

    /// The declared index named `name`.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexStore> {
        self.indexes.get(name)
    }

    /// Collections this one relates to through `collection:` indexes.
    #[must_use]
    pub fn relation_targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = self
            .indexes
            .values()
            .filter_map(|store| store.kind().target())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Creates a new, unsaved document with a fresh id, initialized by the
    /// collection's model.
    #[must_use]
    pub fn create(self: &Arc<Self>) -> Document {
        let mut document = Document::new(DocumentId::generate(), Arc::clone(self));
        self.model.on_create(&mut document);
        trace!(collection = %self.name, id = %document.id(), "created document");
        document
    }

    /// Loads a document and, recursively, every document it relates to.
    ///
    /// # Errors
    ///
    /// - `DocumentNotFound` if this or any related document is absent
    /// - `InvalidFormat` if a resource is not a document record
    /// - `InvalidRelationalId` for a malformed stored reference
    /// - `CollectionNotFound` if a reference names an unknown collection
    /// - `RelationCycle` if a document relates back to one being fetched
    pub fn fetch(self: &Arc<Self>, id: impl AsRef<str>) -> CoreResult<Document> {
        let id = DocumentId::new(id.as_ref());
        self.fetch_along(&id, &mut Vec::new())
    }

    fn fetch_along(
        self: &Arc<Self>,
        id: &DocumentId,
        path: &mut Vec<RelationalId>,
    ) -> CoreResult<Document> {
        let relational_id = RelationalId::new(self.name.clone(), id.clone());
        if path.contains(&relational_id) {
            return Err(CoreError::RelationCycle {
                relational_id: relational_id.to_string(),
            });
        }

        let record = self.read_record(id)?;
        trace!(
            collection = %self.name,
            %id,
            relations = record.related.len(),
            "fetched document"
        );

        let mut document = Document::new(id.clone(), Arc::clone(self));
        path.push(relational_id);
        for (name, reference) in &record.related {
            let target = RelationalId::parse(reference)?;
            let related = self
                .resolve(target.collection())?
                .fetch_along(target.document(), path)?;
            document.set_related(name.clone(), related);
        }
        path.pop();

        document.set_all(record.data);
        Ok(document)
    }

    /// Looks up documents by an indexed field's value.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `index` is not declared, and any
    /// error from reading the index or fetching a listed document.
    pub fn query(self: &Arc<Self>, index: &str, value: impl Into<Value>) -> CoreResult<QueryResult> {
        let store = self.indexes.get(index).ok_or_else(|| {
            CoreError::configuration(&self.name, format!("index \"{index}\" is not declared"))
        })?;
        let value = value.into();
        let key = index_keys(store.kind(), Some(&value)).into_iter().next();

        let ids = match &key {
            Some(key) => store.lookup(key)?,
            None => Vec::new(),
        };
        trace!(collection = %self.name, index, key = ?key, hits = ids.len(), "queried index");

        match store.kind() {
            IndexKind::Unique => {
                let document = ids.first().map(|id| self.fetch(id)).transpose()?;
                Ok(QueryResult::Unique(document))
            }
            IndexKind::Group => ids
                .iter()
                .map(|id| self.fetch(id))
                .collect::<CoreResult<Vec<_>>>()
                .map(QueryResult::Group),
            IndexKind::Collection(_) => Ok(QueryResult::Relation),
        }
    }

    /// Records `document` in every non-relation index.
    ///
    /// Each index resource is rewritten, whether or not the indexed field
    /// changed.
    ///
    /// # Errors
    ///
    /// Fails on the first index that cannot be read, decoded or written.
    pub fn update_indexes(&self, document: &Document) -> CoreResult<()> {
        for (name, store) in &self.indexes {
            if store.kind().is_relation() {
                continue;
            }
            let keys = index_keys(store.kind(), document.get(name));
            trace!(collection = %self.name, index = %name, keys = keys.len(), "updating index");
            store.update(|index| {
                for key in keys {
                    index.insert(key, document.id().clone());
                }
            })?;
        }
        Ok(())
    }

    /// Recomputes every non-relation index from the stored documents.
    ///
    /// Documents are scanned in id order, so for a unique key held by
    /// several documents the one with the greatest id wins. Returns the
    /// number of documents scanned.
    ///
    /// # Errors
    ///
    /// Fails if a document cannot be read or an index cannot be written.
    pub fn rebuild_indexes(&self) -> CoreResult<usize> {
        let mut fresh = empty_indexes(
            self.indexes
                .iter()
                .map(|(name, store)| (name.as_str(), store.kind())),
        );

        let ids = self.document_ids()?;
        for id in &ids {
            let record = self.read_record(id)?;
            for (name, data) in &mut fresh {
                let kind = self.indexes[*name].kind();
                for key in index_keys(kind, record.data.get(*name)) {
                    data.as_index_mut().insert(key, id.clone());
                }
            }
        }

        for (name, data) in &fresh {
            self.indexes[*name].replace(data)?;
        }
        info!(
            collection = %self.name,
            documents = ids.len(),
            indexes = fresh.len(),
            "rebuilt indexes"
        );
        Ok(ids.len())
    }

    /// Checks if a document resource exists for `id`.
    #[must_use]
    pub fn exists(&self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        DocumentId::new(id).is_valid() && self.backend.exists(&self.layout.document_path(id))
    }

    /// Ids of every stored document, sorted.
    ///
    /// # Errors
    ///
    /// Fails if the entries directory cannot be listed.
    pub fn document_ids(&self) -> CoreResult<Vec<DocumentId>> {
        let entries = match self.backend.list(&self.layout.entries_dir()) {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(entries
            .iter()
            .filter_map(|entry| resource_stem(entry))
            .map(DocumentId::new)
            .filter(DocumentId::is_valid)
            .collect())
    }

    /// Number of stored documents.
    ///
    /// # Errors
    ///
    /// Fails if the entries directory cannot be listed.
    pub fn count(&self) -> CoreResult<usize> {
        Ok(self.document_ids()?.len())
    }

    /// Reads the stored record of `id` without following relations.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` if the resource is absent, unreadable or empty;
    /// `InvalidFormat` if it is not a document record.
    pub fn read_record(&self, id: &DocumentId) -> CoreResult<DocumentRecord> {
        let not_found = || CoreError::document_not_found(&self.name, id.as_str());
        if !id.is_valid() {
            return Err(not_found());
        }

        let path = self.layout.document_path(id.as_str());
        let bytes = match self.backend.read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(collection = %self.name, %id, error = %e, "document unreadable");
                return Err(not_found());
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(not_found());
        }

        DocumentRecord::decode(&bytes).map_err(|e| {
            CoreError::invalid_format(format!("{}: {e}", path.display()))
        })
    }

    pub(crate) fn write_document(&self, document: &Document) -> CoreResult<()> {
        let path = self.layout.document_path(document.id().as_str());
        let bytes = document.to_record().encode(self.pretty_json)?;
        self.backend.write(&path, &bytes)?;
        trace!(collection = %self.name, id = %document.id(), "wrote document");
        Ok(())
    }

    fn resolve(&self, name: &str) -> CoreResult<Arc<Collection>> {
        let lookup = self.lookup.upgrade().ok_or(CoreError::DatabaseClosed)?;
        lookup.collection(name)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("model", &self.model.name())
            .field("indexes", &self.indexes)
            .finish_non_exhaustive()
    }
}

/// Collection names are single path components without the relation
/// separator.
pub(crate) fn is_valid_collection_name(name: &str) -> bool {
    crate::dir::is_valid_resource_name(name) && !name.contains(crate::document::RELATION_SEPARATOR)
}

fn read_settings(
    name: &str,
    layout: &CollectionLayout,
    backend: &dyn ResourceBackend,
) -> CoreResult<CollectionConfig> {
    let bytes = backend.read(&layout.config_path()).map_err(|e| {
        if e.is_not_found() {
            CoreError::configuration(name, "missing collection.json")
        } else {
            e.into()
        }
    })?;
    from_json_or_default(&bytes)
        .map_err(|e| CoreError::configuration(name, format!("invalid collection.json: {e}")))
}
