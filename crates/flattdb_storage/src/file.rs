//! File-based resource backend for persistent storage.

use crate::backend::{normalize, ResourceBackend};
use crate::error::{StorageError, StorageResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix appended to a resource name while it is being written.
const TEMP_SUFFIX: &str = ".tmp";

/// A file-based resource backend.
///
/// Every resource is a file below the root directory. Writes go to a
/// temporary sibling which is then renamed over the target, so readers
/// see either the old or the new content, never a torn write.
///
/// # Durability
///
/// With `sync_writes` enabled the temporary file is `sync_all`ed before
/// the rename. FlattDB makes no crash-recovery guarantees beyond that.
///
/// # Example
///
/// ```no_run
/// use flattdb_storage::{FileBackend, ResourceBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("data")).unwrap();
/// backend.write(Path::new("users/entries/abc.json"), b"{}").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    sync_writes: bool,
}

impl FileBackend {
    /// Opens a backend rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the directory does not exist.
    pub fn open(root: &Path) -> StorageResult<Self> {
        if !root.is_dir() {
            return Err(StorageError::not_found(root));
        }
        Ok(Self {
            root: root.to_path_buf(),
            sync_writes: false,
        })
    }

    /// Opens a backend, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_with_create_dirs(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        Self::open(root)
    }

    /// Sets whether every write is synced to disk before it is renamed
    /// into place.
    #[must_use]
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> StorageResult<PathBuf> {
        Ok(self.root.join(normalize(path)?))
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(TEMP_SUFFIX);
    target.with_file_name(name)
}

fn write_temp(temp: &Path, data: &[u8], sync: bool) -> io::Result<()> {
    let mut file = File::create(temp)?;
    file.write_all(data)?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}

fn not_found_or_io(err: io::Error, path: &Path) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        StorageError::not_found(path)
    } else {
        StorageError::Io(err)
    }
}

impl ResourceBackend for FileBackend {
    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        let full = self.resolve(path)?;
        fs::read(&full).map_err(|e| not_found_or_io(e, path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let full = self.resolve(path)?;
        if full == self.root {
            return Err(StorageError::InvalidPath {
                path: path.to_path_buf(),
            });
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = temp_path(&full);
        let written = write_temp(&temp, data, self.sync_writes)
            .and_then(|()| fs::rename(&temp, &full));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp);
            return Err(err.into());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).map(|p| p.is_dir()).unwrap_or(false)
    }

    fn create_dir(&self, path: &Path) -> StorageResult<()> {
        fs::create_dir_all(self.resolve(path)?)?;
        Ok(())
    }

    fn list(&self, path: &Path) -> StorageResult<Vec<String>> {
        let full = self.resolve(path)?;
        let entries = fs::read_dir(&full).map_err(|e| not_found_or_io(e, path))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_requires_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        let result = FileBackend::open(&missing);
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn open_with_create_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("db");

        let backend = FileBackend::open_with_create_dirs(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root);
    }

    #[test]
    fn write_and_read() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        backend
            .write(Path::new("users/entries/a.json"), b"{\"x\":1}")
            .unwrap();

        let data = backend.read(Path::new("users/entries/a.json")).unwrap();
        assert_eq!(&data, b"{\"x\":1}");
        assert!(dir.path().join("users/entries/a.json").is_file());
    }

    #[test]
    fn write_replaces_whole_resource() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap().sync_writes(true);
        let path = Path::new("idx.json");

        backend.write(path, b"a much longer first version").unwrap();
        backend.write(path, b"short").unwrap();

        assert_eq!(backend.read(path).unwrap(), b"short");
        assert!(!dir.path().join("idx.json.tmp").exists());
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        // A directory in the way makes the final rename fail.
        fs::create_dir_all(dir.path().join("taken/inner")).unwrap();
        let result = backend.write(Path::new("taken"), b"data");

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(!dir.path().join("taken.tmp").exists());
        assert!(dir.path().join("taken/inner").is_dir());
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        let err = backend.read(Path::new("nope.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn list_sorted_children() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        backend.write(Path::new("c/b.json"), b"1").unwrap();
        backend.write(Path::new("c/a.json"), b"2").unwrap();
        backend.create_dir(Path::new("c/sub")).unwrap();

        let names = backend.list(Path::new("c")).unwrap();
        assert_eq!(names, vec!["a.json", "b.json", "sub"]);
        assert!(backend.is_dir(Path::new("c/sub")));
        assert!(!backend.is_dir(Path::new("c/a.json")));
    }

    #[test]
    fn list_missing_dir_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        let err = backend.list(Path::new("ghost")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn escaping_root_is_rejected() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        let result = backend.write(Path::new("../outside.json"), b"x");
        assert!(matches!(result, Err(StorageError::InvalidPath { .. })));
        assert!(!backend.exists(Path::new("../outside.json")));
    }
}
