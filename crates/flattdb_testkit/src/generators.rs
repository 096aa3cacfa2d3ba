//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use flattdb_codec::{Fields, Value};
use proptest::prelude::*;

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating field names.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for generating index keys: short text that is never empty.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,8}").expect("Invalid regex")
}

/// Strategy for scalar values. Floats are always finite.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e12..1.0e12f64).prop_map(Value::Float),
        ".{0,16}".prop_map(Value::Text),
    ]
}

/// Strategy for arbitrary field values, nested up to a few levels.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_value_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(field_name_strategy(), inner, 0..4).prop_map(Value::Map),
        ]
    })
}

/// Strategy for a document's field data.
pub fn fields_strategy() -> impl Strategy<Value = Fields> {
    prop::collection::btree_map(field_name_strategy(), value_strategy(), 0..6)
}

/// Strategy for a `tags`-style list of keys, possibly with repeats.
pub fn tags_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(key_strategy(), 0..5)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_floats_are_finite(value in value_strategy()) {
            fn finite(value: &Value) -> bool {
                match value {
                    Value::Float(f) => f.is_finite(),
                    Value::Array(items) => items.iter().all(finite),
                    Value::Map(map) => map.values().all(finite),
                    _ => true,
                }
            }
            prop_assert!(finite(&value));
        }

        #[test]
        fn keys_are_never_empty(key in key_strategy()) {
            prop_assert!(!key.is_empty());
        }
    }
}
