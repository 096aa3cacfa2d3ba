//! `collection.json`.

use crate::error::{CoreError, CoreResult};
use crate::index::IndexKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indexes a collection gets when its configuration declares none:
/// `name` (unique) and `tags` (group).
#[must_use]
pub fn default_indexes() -> BTreeMap<String, IndexKind> {
    BTreeMap::from([
        ("name".to_string(), IndexKind::Unique),
        ("tags".to_string(), IndexKind::Group),
    ])
}

/// Parsed contents of a collection's `collection.json`.
///
/// ```json
/// {"model": "user", "indexes": {"email": "unique", "author": "collection:users"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Name of the registered document model. Absent means the default
    /// model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Index name to index type. Absent means [`default_indexes`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<BTreeMap<String, String>>,
}

impl CollectionConfig {
    /// Creates a configuration using the default model and indexes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the document model.
    #[must_use]
    pub fn model(mut self, name: impl Into<String>) -> Self {
        self.model = Some(name.into());
        self
    }

    /// Declares an index. The first declaration replaces the defaults.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>, kind: &IndexKind) -> Self {
        self.indexes
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), kind.to_string());
        self
    }

    /// The declared indexes with their kinds parsed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming `collection` for an unknown
    /// index type or an index name that cannot name a resource.
    pub fn index_kinds(&self, collection: &str) -> CoreResult<BTreeMap<String, IndexKind>> {
        let Some(declared) = &self.indexes else {
            return Ok(default_indexes());
        };

        declared
            .iter()
            .map(|(name, raw)| {
                if !crate::dir::is_valid_resource_name(name) {
                    return Err(CoreError::configuration(
                        collection,
                        format!("invalid index name \"{name}\""),
                    ));
                }
                let kind = IndexKind::parse(raw).ok_or_else(|| {
                    CoreError::configuration(
                        collection,
                        format!("unknown index type \"{raw}\" for index \"{name}\""),
                    )
                })?;
                Ok((name.clone(), kind))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flattdb_codec::from_json_or_default;

    #[test]
    fn absent_indexes_use_defaults() {
        let config: CollectionConfig = from_json_or_default(b"{}").unwrap();
        assert_eq!(config.index_kinds("c").unwrap(), default_indexes());

        let config: CollectionConfig = from_json_or_default(b"").unwrap();
        assert_eq!(config.model, None);
    }

    #[test]
    fn declared_indexes_replace_defaults() {
        let config: CollectionConfig = from_json_or_default(
            br#"{"model":"user","indexes":{"email":"unique","author":"collection:users"}}"#,
        )
        .unwrap();

        let kinds = config.index_kinds("posts").unwrap();
        assert_eq!(config.model.as_deref(), Some("user"));
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds["author"], IndexKind::Collection("users".into()));
        assert!(!kinds.contains_key("name"));
    }

    #[test]
    fn empty_declaration_means_no_indexes() {
        let config: CollectionConfig = from_json_or_default(br#"{"indexes":{}}"#).unwrap();
        assert!(config.index_kinds("c").unwrap().is_empty());
    }

    #[test]
    fn unknown_type_is_configuration_error() {
        let config = CollectionConfig {
            model: None,
            indexes: Some(BTreeMap::from([("body".into(), "fulltext".into())])),
        };
        let err = config.index_kinds("posts").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("unknown index type"));
    }

    #[test]
    fn bad_index_name_rejected() {
        let config = CollectionConfig::new().index("../x", &IndexKind::Unique);
        assert!(config.index_kinds("c").unwrap_err().is_configuration());
    }

    #[test]
    fn builder_serializes_compactly() {
        let config = CollectionConfig::new()
            .model("user")
            .index("email", &IndexKind::Unique);
        let json = flattdb_codec::to_json(&config).unwrap();
        assert_eq!(json, br#"{"model":"user","indexes":{"email":"unique"}}"#);

        let json = flattdb_codec::to_json(&CollectionConfig::new()).unwrap();
        assert_eq!(json, b"{}");
    }
}
