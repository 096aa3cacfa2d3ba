//! # FlattDB Codec
//!
//! The structured text codec used for every FlattDB resource.
//!
//! This crate provides:
//! - [`Value`], the tagged value type stored in document fields
//! - [`Fields`], an ordered field-name to value mapping
//! - JSON encoding and decoding built on `serde_json`
//!
//! ## Usage
//!
//! ```
//! use flattdb_codec::{from_json, to_json, Value};
//!
//! let value = Value::from(vec!["admin", "staff"]);
//! let bytes = to_json(&value).unwrap();
//! assert_eq!(bytes, br#"["admin","staff"]"#);
//!
//! let decoded: Value = from_json(&bytes).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{from_json, from_json_or_default, lenient_map};
pub use encoder::{to_json, to_json_pretty};
pub use error::{CodecError, CodecResult};
pub use value::{Fields, Value};
