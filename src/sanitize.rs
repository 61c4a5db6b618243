//! Data sanitization - drops data fields the schema does not declare.

use serde_json::{Map, Value};

use crate::path::{node_path, FieldPath};

/// Remove every key of `data` that has no matching node in `properties`.
///
/// `properties` is a schema's `properties` map. Nested objects are cleaned
/// recursively; arrays, scalars and `null` are copied verbatim once their key
/// is accepted.
pub fn clean_data(data: &Value, properties: &Value) -> Value {
    clean_data_at(data, properties, None)
}

/// Like [`clean_data`], treating `data` as the value found at `parent`.
pub fn clean_data_at(data: &Value, properties: &Value, parent: Option<&FieldPath>) -> Value {
    let prefix: Vec<String> = parent
        .map(|p| p.segments().to_vec())
        .unwrap_or_default();
    clean_value(data, properties, &prefix)
}

fn clean_value(data: &Value, properties: &Value, prefix: &[String]) -> Value {
    let Some(map) = data.as_object() else {
        return data.clone();
    };

    let mut result = Map::new();
    for (key, value) in map {
        let mut segments = prefix.to_vec();
        segments.push(key.clone());

        if !declares(properties, &segments) {
            continue;
        }

        let cleaned = if value.is_object() {
            clean_value(value, properties, &segments)
        } else {
            value.clone()
        };
        result.insert(key.clone(), cleaned);
    }
    Value::Object(result)
}

/// True when `properties.<s0>.properties.<s1>...` exists.
fn declares(properties: &Value, segments: &[String]) -> bool {
    // The leading "properties" is dropped: `properties` is already that map.
    node_path(segments)
        .into_iter()
        .skip(1)
        .try_fold(properties, |node, key| node.get(key))
        .is_some()
}
