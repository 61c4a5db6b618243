//! Conditional visibility - prunes a schema against live data.
//!
//! The UI map mirrors the schema's property tree without the `properties`
//! segments. A field carries a visibility rule under `ui:if`, mapping dotted
//! data paths to the literal value they must hold:
//!
//! ```json
//! {
//!   "form": {
//!     "friendName": { "ui:if": { "form.referAFriend": true } }
//!   }
//! }
//! ```

use serde_json::{Map, Value};

use crate::path::PROPERTIES;

/// UI map key holding a visibility rule.
pub const UI_IF: &str = "ui:if";

/// Return a copy of `schema` with fields hidden by their visibility rule removed.
///
/// Object nodes without a rule are kept and their children evaluated
/// independently; a node that passes its rule is kept verbatim; a node
/// that fails it is dropped along with its subtree. Root keywords are
/// copied as-is.
pub fn apply_conditions(schema: &Value, ui: &Value, data: &Value) -> Value {
    let Some(props) = schema.get(PROPERTIES).and_then(Value::as_object) else {
        return schema.clone();
    };

    let mut result = schema.clone();
    if let Some(map) = result.as_object_mut() {
        map.insert(
            PROPERTIES.to_string(),
            Value::Object(prune_properties(props, Some(ui), data)),
        );
    }
    result
}

/// Evaluate a `ui:if` rule: every predicate path in `data` must strictly equal its expected value.
///
/// A predicate path missing from `data` reads as `null`. An empty rule is satisfied.
pub fn is_visible(rule: &Map<String, Value>, data: &Value) -> bool {
    rule.iter()
        .all(|(path, expected)| strict_eq(read_path(data, path).unwrap_or(&Value::Null), expected))
}

// --- Internal implementation ---

/// Numbers compare by value, so `1` and `1.0` are equal.
fn strict_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => actual == expected,
    }
}

fn prune_properties(props: &Map<String, Value>, ui: Option<&Value>, data: &Value) -> Map<String, Value> {
    let mut result = Map::new();

    for (name, prop) in props {
        let prop_ui = ui.and_then(|u| u.get(name));

        match rule_for(prop_ui, name) {
            Some(rule) => {
                if is_visible(rule, data) {
                    result.insert(name.clone(), prop.clone());
                }
            }
            None => {
                result.insert(name.clone(), prune_node(prop, prop_ui, data));
            }
        }
    }

    result
}

fn prune_node(node: &Value, ui: Option<&Value>, data: &Value) -> Value {
    match node.get(PROPERTIES).and_then(Value::as_object) {
        Some(children) => {
            let mut rebuilt = node.clone();
            if let Some(map) = rebuilt.as_object_mut() {
                map.insert(
                    PROPERTIES.to_string(),
                    Value::Object(prune_properties(children, ui, data)),
                );
            }
            rebuilt
        }
        None => node.clone(),
    }
}

fn rule_for<'a>(ui: Option<&'a Value>, name: &str) -> Option<&'a Map<String, Value>> {
    let rule = ui?.get(UI_IF)?;
    match rule.as_object() {
        Some(rule) => Some(rule),
        None => {
            tracing::debug!(field = name, "ignoring non-object ui:if rule");
            None
        }
    }
}

fn read_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
