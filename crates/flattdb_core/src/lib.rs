//! # FlattDB Core
//!
//! Document, index and relation engine for FlattDB.
//!
//! This crate provides:
//! - [`Database`]: a directory of collections, discovered on open
//! - [`Collection`]: documents plus their declared indexes
//! - [`Document`]: ordered field data and fully fetched related documents
//! - Unique and group indexes persisted as JSON resources
//! - A registry of [`DocumentModel`]s collections select by name
//!
//! ## Example
//!
//! ```rust
//! use flattdb_core::{CollectionConfig, Database};
//!
//! let db = Database::open_in_memory().unwrap();
//! let users = db.create_collection("users", &CollectionConfig::new()).unwrap();
//!
//! let mut alice = users.create();
//! alice.set("name", "alice");
//! alice.set("tags", vec!["admin", "staff"]);
//! alice.save().unwrap();
//!
//! let found = users.query("name", "alice").unwrap().into_first().unwrap();
//! assert_eq!(found.id(), alice.id());
//! assert_eq!(users.query("tags", "admin").unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod database;
mod dir;
mod document;
mod error;
mod index;
mod model;

pub use collection::{default_indexes, Collection, CollectionConfig, CollectionLookup, QueryResult};
pub use config::Config;
pub use database::Database;
pub use dir::{CollectionLayout, DatabaseDir};
pub use document::{Document, DocumentId, DocumentRecord, RelationalId, RELATION_SEPARATOR};
pub use error::{CoreError, CoreResult};
pub use index::{
    group_keys, index_keys, scalar_key, unique_key, GroupIndex, Index, IndexData, IndexKind,
    IndexStore, UniqueIndex,
};
pub use model::{DefaultModel, DocumentModel, ModelRegistry, DEFAULT_MODEL};

pub use flattdb_codec::{Fields, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
