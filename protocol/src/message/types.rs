//! Shared value types for message records.
//!
//! Extension data is free-form JSON keyed by string. A `BTreeMap` keeps the
//! key order sorted, which makes the compact wire text byte-for-byte stable
//! across runs and platforms.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// An open, string-keyed extension map. Always present, possibly empty.
pub type FieldMap = BTreeMap<String, Value>;

/// Renders a JSON value into the text form used by string-typed slots.
///
/// Strings pass through unquoted, `null` means "unset", and every other value
/// uses its compact JSON rendering (`42`, `true`, `[1,2]`).
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Converts a [`FieldMap`] into a JSON object value.
pub(crate) fn map_to_value(map: &FieldMap) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Deserializes a JSON `null` the same way as a missing key: into `T::default()`.
///
/// Producers occasionally emit `"addtData": null` or `"txHeader": null`. The
/// envelope never stores an absent record or map, so both collapse to empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_to_text_unquotes_strings() {
        assert_eq!(value_to_text(&json!("C203")).as_deref(), Some("C203"));
    }

    #[test]
    fn value_to_text_renders_scalars() {
        assert_eq!(value_to_text(&json!(42)).as_deref(), Some("42"));
        assert_eq!(value_to_text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(value_to_text(&Value::Null), None);
    }

    #[test]
    fn map_to_value_keeps_entries() {
        let mut map = FieldMap::new();
        map.insert("a".into(), json!(1));
        assert_eq!(map_to_value(&map), json!({"a": 1}));
    }
}
