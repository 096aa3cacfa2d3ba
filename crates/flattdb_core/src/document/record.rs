//! On-disk document shape.

use crate::error::{CoreError, CoreResult};
use flattdb_codec::{from_json, lenient_map, to_json, to_json_pretty, Fields};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The contents of one `entries/<id>.json` resource.
///
/// ```json
/// {"related": {"author": "users:4f0c..."}, "data": {"title": "Hello"}}
/// ```
///
/// Both members may be missing, `null` or `[]`; each reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Relation name to `collection:id` reference.
    #[serde(default, deserialize_with = "lenient_map")]
    pub related: BTreeMap<String, String>,
    /// Field data.
    #[serde(default, deserialize_with = "lenient_map")]
    pub data: Fields,
}

impl DocumentRecord {
    /// Decodes a record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if `bytes` is not a record.
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        from_json(bytes).map_err(|e| CoreError::invalid_format(e.to_string()))
    }

    /// Encodes the record, indented if `pretty` is set.
    ///
    /// # Errors
    ///
    /// Fails if a field holds a value JSON cannot represent.
    pub fn encode(&self, pretty: bool) -> CoreResult<Vec<u8>> {
        let bytes = if pretty {
            to_json_pretty(self)?
        } else {
            to_json(self)?
        };
        Ok(bytes)
    }
}
