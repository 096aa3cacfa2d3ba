//! # FlattDB Storage
//!
//! Resource backends for FlattDB.
//!
//! A FlattDB database is a tree of small structured-text resources
//! (collection configuration, index files, document files). This crate
//! provides the lowest-level access to that tree. Backends are **opaque
//! resource stores**: they read and replace whole resources by relative
//! path and never interpret the bytes.
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - Resources are files under a root directory
//! - [`InMemoryBackend`] - For tests and ephemeral databases
//!
//! ## Example
//!
//! ```rust
//! use flattdb_storage::{InMemoryBackend, ResourceBackend};
//! use std::path::Path;
//!
//! let backend = InMemoryBackend::new();
//! backend.write(Path::new("users/collection.json"), b"{}").unwrap();
//! assert_eq!(backend.read(Path::new("users/collection.json")).unwrap(), b"{}");
//! assert_eq!(backend.list(Path::new("users")).unwrap(), vec!["collection.json"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::ResourceBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
