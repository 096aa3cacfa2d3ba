//! Deriving index keys from field values.
//!
//! Keys are strings. Text is used as-is, numbers use their decimal
//! rendering and booleans become `"true"`/`"false"`. Null, missing fields
//! and mappings never produce a key, so such documents are left out of the
//! index.

use super::IndexKind;
use flattdb_codec::Value;

/// The key a scalar value indexes under, or `None` if it has none.
#[must_use]
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text.clone()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Map(_) => None,
    }
}

/// Key for a unique index. Arrays have no unique key.
#[must_use]
pub fn unique_key(value: Option<&Value>) -> Option<String> {
    value.and_then(scalar_key)
}

/// Keys for a group index: one per distinct keyable element of an
/// array, or the single scalar key.
#[must_use]
pub fn group_keys(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => {
            let mut keys: Vec<String> = Vec::with_capacity(items.len());
            for key in items.iter().filter_map(scalar_key) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            keys
        }
        Some(other) => scalar_key(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Keys `value` contributes to an index of `kind`.
#[must_use]
pub fn index_keys(kind: &IndexKind, value: Option<&Value>) -> Vec<String> {
    match kind {
        IndexKind::Unique => unique_key(value).into_iter().collect(),
        IndexKind::Group => group_keys(value),
        IndexKind::Collection(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn scalar_keys() {
        assert_eq!(scalar_key(&Value::from("alice")), Some("alice".into()));
        assert_eq!(scalar_key(&Value::from(42)), Some("42".into()));
        assert_eq!(scalar_key(&Value::from(2.5)), Some("2.5".into()));
        assert_eq!(scalar_key(&Value::from(true)), Some("true".into()));
        assert_eq!(scalar_key(&Value::Null), None);
        assert_eq!(scalar_key(&Value::Map(BTreeMap::new())), None);
    }

    #[test]
    fn unique_ignores_arrays() {
        let tags = Value::from(vec!["a", "b"]);
        assert_eq!(unique_key(Some(&tags)), None);
        assert_eq!(unique_key(None), None);
    }

    #[test]
    fn group_expands_arrays() {
        let tags = Value::from(vec!["admin", "staff", "admin"]);
        assert_eq!(group_keys(Some(&tags)), vec!["admin", "staff"]);

        let single = Value::from("admin");
        assert_eq!(group_keys(Some(&single)), vec!["admin"]);
    }

    #[test]
    fn group_skips_unkeyable_elements() {
        let mixed = Value::Array(vec![Value::Null, Value::from(1), Value::Array(vec![])]);
        assert_eq!(group_keys(Some(&mixed)), vec!["1"]);
        assert!(group_keys(Some(&Value::Null)).is_empty());
    }

    #[test]
    fn relation_kind_has_no_keys() {
        let kind = IndexKind::Collection("users".into());
        assert!(index_keys(&kind, Some(&Value::from("x"))).is_empty());
    }
}
