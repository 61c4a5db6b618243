//! Field path editing - exclude, require and merge-update schema nodes.
//!
//! Every public operation takes the root schema by reference and returns a
//! new tree. The `*_in_place` variants work on a tree the caller already
//! owns; the config resolver uses them on its private copy.
//!
//! # Merge rule
//!
//! | Overlay value | Base value | Result |
//! |---------------|------------|--------|
//! | object | object | merged key by key, recursively |
//! | object | anything else | overlay |
//! | array, scalar, `null` | anything | overlay (arrays are never concatenated) |

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::path::{FieldPath, PROPERTIES};

/// Remove the node at `path`, keeping the parent's `required` list consistent.
///
/// Removing a path that does not exist is a no-op.
pub fn exclude(schema: &Value, path: &FieldPath) -> Value {
    let mut result = schema.clone();
    exclude_in_place(&mut result, path);
    result
}

/// Append the leaf of `path` to its parent's `required` list.
///
/// # Errors
///
/// Returns `ResolveError::PathNotFound` if the parent node does not exist.
pub fn set_required(schema: &Value, path: &FieldPath) -> Result<Value, ResolveError> {
    let mut result = schema.clone();
    set_required_in_place(&mut result, path)?;
    Ok(result)
}

/// Deep-merge `partial` into the node at `path`, creating the leaf if missing.
///
/// # Errors
///
/// Returns `ResolveError::PathNotFound` if the parent node does not exist.
pub fn update(schema: &Value, path: &FieldPath, partial: &Value) -> Result<Value, ResolveError> {
    let mut result = schema.clone();
    update_in_place(&mut result, path, partial)?;
    Ok(result)
}

/// Deep-merge `partial` at the schema root.
pub fn augment(schema: &Value, partial: &Value) -> Value {
    deep_merge(schema, partial)
}

/// Merge `overlay` onto `base`: objects recurse, everything else replaces.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let mut result = base.clone();
    merge_into(&mut result, overlay);
    result
}

pub(crate) fn exclude_in_place(schema: &mut Value, path: &FieldPath) {
    let Ok(parent) = parent_node_mut(schema, path) else {
        return;
    };
    let leaf = path.leaf();

    let removed = parent
        .get_mut(PROPERTIES)
        .and_then(Value::as_object_mut)
        .and_then(|props| props.shift_remove(leaf))
        .is_some();

    if let Some(Value::Array(required)) = parent.get_mut("required") {
        required.retain(|r| r.as_str() != Some(leaf));
    }

    if removed {
        tracing::debug!(path = %path, "excluded field");
    }
}

pub(crate) fn set_required_in_place(
    schema: &mut Value,
    path: &FieldPath,
) -> Result<(), ResolveError> {
    let parent = parent_node_mut(schema, path)?;
    let leaf = path.leaf();

    let required = parent
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !required.is_array() {
        return Err(ResolveError::InvalidSchema {
            message: format!("required of {} parent is not an array", path),
        });
    }
    if let Value::Array(required) = required {
        if !required.iter().any(|r| r.as_str() == Some(leaf)) {
            required.push(Value::String(leaf.to_string()));
        }
    }
    Ok(())
}

pub(crate) fn update_in_place(
    schema: &mut Value,
    path: &FieldPath,
    partial: &Value,
) -> Result<(), ResolveError> {
    let parent = parent_node_mut(schema, path)?;
    let props = parent
        .entry(PROPERTIES)
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(props) = props else {
        return Err(ResolveError::InvalidSchema {
            message: format!("properties of {} parent is not an object", path),
        });
    };

    match props.get_mut(path.leaf()) {
        Some(node) => merge_into(node, partial),
        None => {
            props.insert(path.leaf().to_string(), partial.clone());
        }
    }
    Ok(())
}

pub(crate) fn merge_into(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Walk to the object that owns the leaf of `path` (the root for top-level fields).
fn parent_node_mut<'a>(
    schema: &'a mut Value,
    path: &FieldPath,
) -> Result<&'a mut Map<String, Value>, ResolveError> {
    let mut current = schema;
    for segment in path.parent() {
        current = current
            .get_mut(PROPERTIES)
            .and_then(|props| props.get_mut(segment))
            .ok_or_else(|| ResolveError::PathNotFound {
                path: path.to_string(),
                segment: segment.clone(),
            })?;
    }
    current
        .as_object_mut()
        .ok_or_else(|| ResolveError::InvalidSchema {
            message: format!("parent of {} is not an object schema", path),
        })
}
