//! JSON decoding.

use crate::error::{CodecError, CodecResult};
use serde::de::{DeserializeOwned, Error as _, IgnoredAny};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Decodes JSON bytes into `T`.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
}

/// Decodes JSON bytes into `T`, treating blank input as `T::default()`.
///
/// Freshly provisioned resources are frequently empty files; those decode
/// to the empty value rather than failing.
pub fn from_json_or_default<T: DeserializeOwned + Default>(bytes: &[u8]) -> CodecResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    from_json(bytes)
}

/// Deserializes a string-keyed mapping, also accepting `null` and `[]`
/// as the empty mapping.
///
/// Encoders that cannot tell an empty list from an empty mapping write
/// `[]` for both; use with `#[serde(deserialize_with = "lenient_map")]`.
pub fn lenient_map<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape<V> {
        Map(BTreeMap<String, V>),
        List(Vec<IgnoredAny>),
        Null,
    }

    match Shape::deserialize(deserializer)? {
        Shape::Map(map) => Ok(map),
        Shape::List(items) if items.is_empty() => Ok(BTreeMap::new()),
        Shape::List(_) => Err(D::Error::custom("expected a mapping, found a non-empty list")),
        Shape::Null => Ok(BTreeMap::new()),
    }
}
