//! # FlattDB Testkit
//!
//! Test utilities for FlattDB.
//!
//! This crate provides:
//! - Test fixtures and database helpers
//! - Property-based test generators using proptest
//! - Cross-crate integration test helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flattdb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_database() {
//!     with_temp_db(|db| {
//!         let users = db.create_collection("users", &CollectionConfig::new()).unwrap();
//!         // ... test operations
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use flattdb_core::{CollectionConfig, Database, IndexKind};
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
