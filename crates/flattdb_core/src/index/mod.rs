//! Secondary indexes.
//!
//! Every index a collection declares is backed by one JSON resource under
//! `<collection>/indexes/`. The index name is also the name of the field
//! it indexes.
//!
//! # Index Types
//!
//! - [`UniqueIndex`]: key to a single document id (last write wins)
//! - [`GroupIndex`]: key to a list of document ids
//!
//! A third declaration kind, `collection:<target>`, marks a relation
//! field. It has no resource contents of its own and is never written by
//! the save path.

mod group;
mod key;
mod kind;
mod store;
mod traits;
mod unique;

pub use group::GroupIndex;
pub use key::{group_keys, index_keys, scalar_key, unique_key};
pub use kind::IndexKind;
pub use store::{IndexData, IndexStore};
pub(crate) use store::empty_indexes;
pub use traits::Index;
pub use unique::UniqueIndex;
