//! Resource backend trait definition.

use crate::error::StorageResult;
use std::path::Path;

/// A store of whole resources addressed by relative path.
///
/// # Invariants
///
/// - `write` replaces the resource in full; there are no partial updates
/// - `read` returns exactly the bytes of the last successful `write`
/// - Parent directories are implied by `write`
/// - Backends must be `Send + Sync` so collections can share them
///
/// Nothing is held open between calls: every operation acquires and
/// releases its own handle.
///
/// # Implementors
///
/// - [`super::FileBackend`] - For persistent storage
/// - [`super::InMemoryBackend`] - For testing
pub trait ResourceBackend: Send + Sync {
    /// Reads the whole resource at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the resource does not exist, or an I/O error.
    fn read(&self, path: &Path) -> StorageResult<Vec<u8>>;

    /// Replaces the resource at `path` with `data`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()>;

    /// Returns true if a resource exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Returns true if `path` names a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Creates the directory at `path` (and its parents) if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn create_dir(&self, path: &Path) -> StorageResult<()>;

    /// Lists the names of the immediate children of the directory at `path`,
    /// sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the directory does not exist.
    fn list(&self, path: &Path) -> StorageResult<Vec<String>>;
}

/// Normalizes a relative resource path.
///
/// Rejects absolute paths and `..` components so a backend can never be
/// steered outside its root. `.` components are dropped.
pub(crate) fn normalize(path: &Path) -> StorageResult<std::path::PathBuf> {
    use crate::error::StorageError;
    use std::path::Component;

    let mut out = std::path::PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::InvalidPath {
                    path: path.to_path_buf(),
                });
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn normalize_drops_cur_dir() {
        let p = normalize(Path::new("./users/./entries/a.json")).unwrap();
        assert_eq!(p, Path::new("users/entries/a.json"));
    }

    #[test]
    fn normalize_rejects_parent_dir() {
        let result = normalize(Path::new("users/../../etc/passwd"));
        assert!(matches!(result, Err(StorageError::InvalidPath { .. })));
    }

    #[test]
    fn normalize_rejects_absolute() {
        assert!(normalize(Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn normalize_empty_is_root() {
        assert_eq!(normalize(Path::new("")).unwrap(), Path::new(""));
    }
}
