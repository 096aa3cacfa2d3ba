//! JSON encoding.

use crate::error::{CodecError, CodecResult};
use serde::Serialize;

/// Encodes a value to compact JSON bytes.
///
/// Maps backed by `BTreeMap` serialize with sorted keys, so encoding a
/// given [`crate::Value`] is deterministic.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Encodes a value to indented JSON bytes.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
}
