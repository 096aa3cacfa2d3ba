//! Documents and the references between them.
//!
//! A stored document is a [`DocumentRecord`]: its field data plus a map
//! of relation name to [`RelationalId`]. In memory a [`Document`] holds
//! the related documents themselves, fully fetched.

#[allow(clippy::module_inception)]
mod document;
mod id;
mod record;
mod relational;

pub use document::Document;
pub use id::DocumentId;
pub use record::DocumentRecord;
pub use relational::{RelationalId, RELATION_SEPARATOR};
