//! Persisted index resources.

use super::group::GroupIndex;
use super::kind::IndexKind;
use super::traits::Index;
use super::unique::UniqueIndex;
use crate::document::DocumentId;
use crate::error::{CoreError, CoreResult};
use flattdb_codec::{from_json_or_default, to_json, to_json_pretty, Value};
use flattdb_storage::ResourceBackend;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// In-memory contents of one index resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexData {
    /// Contents of a `unique` index.
    Unique(UniqueIndex),
    /// Contents of a `group` index.
    Group(GroupIndex),
}

impl IndexData {
    /// An empty index of `kind`, or `None` for relation declarations.
    #[must_use]
    pub fn empty(kind: &IndexKind) -> Option<Self> {
        match kind {
            IndexKind::Unique => Some(Self::Unique(UniqueIndex::new())),
            IndexKind::Group => Some(Self::Group(GroupIndex::new())),
            IndexKind::Collection(_) => None,
        }
    }

    /// The contents as a trait object.
    #[must_use]
    pub fn as_index(&self) -> &dyn Index {
        match self {
            Self::Unique(index) => index,
            Self::Group(index) => index,
        }
    }

    /// The contents as a mutable trait object.
    pub fn as_index_mut(&mut self) -> &mut dyn Index {
        match self {
            Self::Unique(index) => index,
            Self::Group(index) => index,
        }
    }

    fn encode(&self, pretty: bool) -> CoreResult<Vec<u8>> {
        let bytes = match (self, pretty) {
            (Self::Unique(index), false) => to_json(index)?,
            (Self::Unique(index), true) => to_json_pretty(index)?,
            (Self::Group(index), false) => to_json(index)?,
            (Self::Group(index), true) => to_json_pretty(index)?,
        };
        Ok(bytes)
    }
}

/// One declared index of a collection and the resource backing it.
///
/// Each update is a read-modify-write of the whole resource. The store
/// serializes its own updates; concurrent writers in other processes are
/// not coordinated.
pub struct IndexStore {
    name: String,
    kind: IndexKind,
    path: PathBuf,
    backend: Arc<dyn ResourceBackend>,
    pretty: bool,
    write_lock: Mutex<()>,
}

impl IndexStore {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: IndexKind,
        path: PathBuf,
        backend: Arc<dyn ResourceBackend>,
        pretty: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            path,
            backend,
            pretty,
            write_lock: Mutex::new(()),
        }
    }

    /// The index name, which is also the indexed field.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared kind.
    #[must_use]
    pub fn kind(&self) -> &IndexKind {
        &self.kind
    }

    /// Path of the backing resource, relative to the database root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current contents. Relation declarations have none.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the resource is neither empty nor a
    /// mapping of the shape this kind expects.
    pub fn load(&self) -> CoreResult<Option<IndexData>> {
        let Some(empty) = IndexData::empty(&self.kind) else {
            return Ok(None);
        };
        let bytes = self.backend.read(&self.path)?;
        self.decode(&bytes, empty).map(Some)
    }

    /// Looks up the ids stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails if the resource cannot be read or decoded.
    pub fn lookup(&self, key: &str) -> CoreResult<Vec<DocumentId>> {
        Ok(self
            .load()?
            .map(|data| data.as_index().lookup(key))
            .unwrap_or_default())
    }

    /// Applies `f` to the current contents and writes the result back.
    /// Does nothing for relation declarations.
    ///
    /// # Errors
    ///
    /// Fails if the resource cannot be read, decoded or written.
    pub fn update<F>(&self, f: F) -> CoreResult<()>
    where
        F: FnOnce(&mut dyn Index),
    {
        let _guard = self.write_lock.lock();
        let Some(mut data) = self.load()? else {
            return Ok(());
        };
        f(data.as_index_mut());
        self.write(&data)
    }

    /// Replaces the contents outright.
    ///
    /// # Errors
    ///
    /// Fails if the resource cannot be written.
    pub fn replace(&self, data: &IndexData) -> CoreResult<()> {
        let _guard = self.write_lock.lock();
        self.write(data)
    }

    fn write(&self, data: &IndexData) -> CoreResult<()> {
        let bytes = data.encode(self.pretty)?;
        self.backend.write(&self.path, &bytes)?;
        trace!(
            index = %self.name,
            path = %self.path.display(),
            keys = data.as_index().len(),
            "wrote index"
        );
        Ok(())
    }

    fn decode(&self, bytes: &[u8], empty: IndexData) -> CoreResult<IndexData> {
        let value: Value = from_json_or_default(bytes).map_err(|e| self.invalid(e))?;
        let entries = match value {
            Value::Null => return Ok(empty),
            Value::Array(items) if items.is_empty() => return Ok(empty),
            Value::Map(entries) => entries,
            other => {
                return Err(self.invalid(format!(
                    "expected a mapping, found {}",
                    other.type_name()
                )))
            }
        };

        let mut data = empty;
        let is_group = matches!(data, IndexData::Group(_));
        let index = data.as_index_mut();
        for (key, value) in entries {
            for id in self.member_ids(&key, value, is_group)? {
                index.insert(key.clone(), id);
            }
        }
        Ok(data)
    }

    fn member_ids(&self, key: &str, value: Value, is_group: bool) -> CoreResult<Vec<DocumentId>> {
        match (value, is_group) {
            (Value::Text(id), false) => Ok(vec![DocumentId::new(id)]),
            (Value::Array(items), true) => items
                .into_iter()
                .map(|item| match item {
                    Value::Text(id) => Ok(DocumentId::new(id)),
                    other => Err(self.invalid(format!(
                        "key \"{key}\" lists a {} instead of a document id",
                        other.type_name()
                    ))),
                })
                .collect(),
            (other, _) => Err(self.invalid(format!(
                "key \"{key}\" maps to a {}",
                other.type_name()
            ))),
        }
    }

    fn invalid(&self, detail: impl fmt::Display) -> CoreError {
        CoreError::invalid_format(format!(
            "index \"{}\" ({}): {detail}",
            self.name,
            self.path.display()
        ))
    }
}

impl fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexStore")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Builds fresh index contents for the non-relation entries of `kinds`.
pub(crate) fn empty_indexes<'a>(
    kinds: impl IntoIterator<Item = (&'a str, &'a IndexKind)>,
) -> BTreeMap<&'a str, IndexData> {
    kinds
        .into_iter()
        .filter_map(|(name, kind)| IndexData::empty(kind).map(|data| (name, data)))
        .collect()
}
