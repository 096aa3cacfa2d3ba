//! Database directory layout and locking.
//!
//! ```text
//! <db_path>/
//! ├─ LOCK                     # Advisory lock for single-writer
//! └─ <collection>/
//!    ├─ collection.json       # model + index declarations
//!    ├─ indexes/<index>.json  # one resource per declared index
//!    └─ entries/<id>.json     # one resource per document
//! ```
//!
//! Paths produced here are relative to the database root; the storage
//! backend resolves them.

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Collection configuration resource name.
pub const COLLECTION_CONFIG: &str = "collection.json";
/// Directory holding a collection's index resources.
pub const INDEXES_DIR: &str = "indexes";
/// Directory holding a collection's document resources.
pub const ENTRIES_DIR: &str = "entries";
/// Extension shared by every resource.
pub const RESOURCE_EXT: &str = ".json";

const LOCK_FILE: &str = "LOCK";

/// Returns the resource stem of `file_name` (`"abc.json"` -> `"abc"`),
/// or `None` if it is not a resource file.
#[must_use]
pub fn resource_stem(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(RESOURCE_EXT)
        .filter(|stem| !stem.is_empty())
}

/// Returns true if `name` can be used as a single path component:
/// non-empty, not a dot entry, no path separators.
#[must_use]
pub fn is_valid_resource_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Relative paths of the resources belonging to one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionLayout {
    root: PathBuf,
}

impl CollectionLayout {
    /// Creates the layout for the collection named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            root: PathBuf::from(name),
        }
    }

    /// The collection directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The collection configuration resource.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(COLLECTION_CONFIG)
    }

    /// The directory of index resources.
    #[must_use]
    pub fn indexes_dir(&self) -> PathBuf {
        self.root.join(INDEXES_DIR)
    }

    /// The resource backing the index named `index`.
    #[must_use]
    pub fn index_path(&self, index: &str) -> PathBuf {
        self.indexes_dir().join(format!("{index}{RESOURCE_EXT}"))
    }

    /// The directory of document resources.
    #[must_use]
    pub fn entries_dir(&self) -> PathBuf {
        self.root.join(ENTRIES_DIR)
    }

    /// The resource holding document `id`.
    #[must_use]
    pub fn document_path(&self, id: &str) -> PathBuf {
        self.entries_dir().join(format!("{id}{RESOURCE_EXT}"))
    }
}

/// Owns a database directory and, optionally, its exclusive lock.
///
/// The lock is advisory: it keeps a second FlattDB process from opening
/// the same directory, nothing more. It is released when this value is
/// dropped.
#[derive(Debug)]
pub struct DatabaseDir {
    path: PathBuf,
    _lock_file: Option<File>,
}

impl DatabaseDir {
    /// Opens or creates a database directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - `lock` is set and another process holds the lock (`DatabaseLocked`)
    /// - I/O errors occur
    pub fn open(path: &Path, create_if_missing: bool, lock: bool) -> CoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(CoreError::invalid_operation(format!(
                    "database directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(CoreError::invalid_operation(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = if lock {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path.join(LOCK_FILE))?;

            if file.try_lock_exclusive().is_err() {
                return Err(CoreError::DatabaseLocked);
            }
            Some(file)
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn layout_paths() {
        let layout = CollectionLayout::new("users");

        assert_eq!(layout.config_path(), Path::new("users/collection.json"));
        assert_eq!(layout.index_path("name"), Path::new("users/indexes/name.json"));
        assert_eq!(layout.document_path("abc"), Path::new("users/entries/abc.json"));
    }

    #[test]
    fn stems() {
        assert_eq!(resource_stem("name.json"), Some("name"));
        assert_eq!(resource_stem(".json"), None);
        assert_eq!(resource_stem("name.json.tmp"), None);
        assert_eq!(resource_stem("README"), None);
    }

    #[test]
    fn open_creates_directory() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("new_db");

        let dir = DatabaseDir::open(&db_path, true, false).unwrap();
        assert!(db_path.is_dir());
        assert_eq!(dir.path(), db_path);
    }

    #[test]
    fn open_fails_if_not_exists_and_no_create() {
        let temp = tempdir().unwrap();
        let result = DatabaseDir::open(&temp.path().join("nonexistent"), false, false);
        assert!(matches!(result, Err(CoreError::InvalidOperation { .. })));
    }

    #[test]
    fn lock_prevents_second_open() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("locked_db");

        let _dir1 = DatabaseDir::open(&db_path, true, true).unwrap();

        let result = DatabaseDir::open(&db_path, true, true);
        assert!(matches!(result, Err(CoreError::DatabaseLocked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("reopen_db");

        {
            let _dir = DatabaseDir::open(&db_path, true, true).unwrap();
        }

        let _dir2 = DatabaseDir::open(&db_path, true, true).unwrap();
    }
}
