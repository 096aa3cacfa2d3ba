//! In-memory resource backend for testing.

use crate::backend::{normalize, ResourceBackend};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// An in-memory resource backend.
///
/// Resources live in a sorted map keyed by normalized relative path.
/// Directories are tracked explicitly: writing a resource implies all of
/// its ancestors, and `create_dir` adds empty ones.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use flattdb_storage::{InMemoryBackend, ResourceBackend};
/// use std::path::Path;
///
/// let backend = InMemoryBackend::new();
/// backend.write(Path::new("a/b.json"), b"[]").unwrap();
/// assert!(backend.is_dir(Path::new("a")));
/// assert_eq!(backend.resource_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    resources: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources.read().len()
    }

    fn add_ancestors(&self, path: &Path) {
        let mut dirs = self.dirs.write();
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            dirs.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }
}

impl ResourceBackend for InMemoryBackend {
    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        let key = normalize(path)?;
        self.resources
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let key = normalize(path)?;
        if key.as_os_str().is_empty() || self.dirs.read().contains(&key) {
            return Err(StorageError::InvalidPath {
                path: path.to_path_buf(),
            });
        }
        self.add_ancestors(&key);
        self.resources.write().insert(key, data.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        match normalize(path) {
            Ok(key) => self.resources.read().contains_key(&key) || self.is_dir(&key),
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        match normalize(path) {
            Ok(key) => key.as_os_str().is_empty() || self.dirs.read().contains(&key),
            Err(_) => false,
        }
    }

    fn create_dir(&self, path: &Path) -> StorageResult<()> {
        let key = normalize(path)?;
        if key.as_os_str().is_empty() {
            return Ok(());
        }
        self.add_ancestors(&key);
        self.dirs.write().insert(key);
        Ok(())
    }

    fn list(&self, path: &Path) -> StorageResult<Vec<String>> {
        let key = normalize(path)?;
        if !self.is_dir(&key) {
            return Err(StorageError::not_found(path));
        }

        let mut names = BTreeSet::new();
        let child_name = |candidate: &Path| -> Option<String> {
            if candidate.parent() == Some(key.as_path()) {
                candidate
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            } else {
                None
            }
        };

        for resource in self.resources.read().keys() {
            names.extend(child_name(resource));
        }
        for dir in self.dirs.read().iter() {
            names.extend(child_name(dir));
        }

        Ok(names.into_iter().collect())
    }
}
