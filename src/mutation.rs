//! Mutation argument extraction from a full structural schema.
//!
//! The full schema exposes each remote write operation under
//! `properties.Mutation.properties[name]`, with its declared arguments as an
//! object sub-schema at `properties.arguments`:
//!
//! ```json
//! {
//!   "properties": {
//!     "Mutation": {
//!       "properties": {
//!         "create_todo": {
//!           "properties": {
//!             "arguments": {
//!               "type": "object",
//!               "properties": { "name": { "type": "string" } },
//!               "required": ["name"]
//!             }
//!           }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use serde_json::{Map, Value};

use crate::error::MutationError;

/// Arguments excluded from generated forms unless the caller says otherwise.
pub const DEFAULT_EXCLUDED_ARGUMENTS: &[&str] = &["id"];

/// Field set and required list derived from a mutation's arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationFields {
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
}

impl MutationFields {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.required.is_empty()
    }
}

/// Extract the argument properties and required list of a named mutation.
///
/// Names listed in `exclude` are dropped from both.
///
/// # Errors
///
/// Returns `MutationError::NotFound` if the mutation is not declared,
/// `MutationError::NoArguments` if it declares no arguments sub-schema, and
/// `MutationError::MalformedSchema` if the full schema has no
/// `properties.Mutation.properties` map.
pub fn mutation_fields(
    full_schema: &Value,
    name: &str,
    exclude: &[&str],
) -> Result<MutationFields, MutationError> {
    let mutations = mutations_map(full_schema)?;

    let mutation = mutations.get(name).ok_or_else(|| MutationError::NotFound {
        name: name.to_string(),
    })?;

    let arguments = mutation
        .get("properties")
        .and_then(|p| p.get("arguments"))
        .and_then(Value::as_object)
        .ok_or_else(|| MutationError::NoArguments {
            name: name.to_string(),
        })?;

    let properties = arguments
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .filter(|(arg, _)| !exclude.contains(&arg.as_str()))
                .map(|(arg, schema)| (arg.clone(), schema.clone()))
                .collect()
        })
        .unwrap_or_default();

    let required = arguments
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .filter(|r| !exclude.contains(r))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(MutationFields {
        properties,
        required,
    })
}

/// List declared mutation names in document order.
///
/// # Errors
///
/// Returns `MutationError::MalformedSchema` if the full schema has no
/// `properties.Mutation.properties` map.
pub fn mutation_names(full_schema: &Value) -> Result<Vec<String>, MutationError> {
    Ok(mutations_map(full_schema)?.keys().cloned().collect())
}

fn mutations_map(full_schema: &Value) -> Result<&Map<String, Value>, MutationError> {
    full_schema
        .get("properties")
        .and_then(|p| p.get("Mutation"))
        .and_then(|m| m.get("properties"))
        .and_then(Value::as_object)
        .ok_or_else(|| MutationError::MalformedSchema {
            message: "expected an object at properties.Mutation.properties".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_schema() -> Value {
        json!({
            "properties": {
                "Mutation": {
                    "type": "object",
                    "properties": {
                        "update_todo": {
                            "type": "object",
                            "properties": {
                                "arguments": {
                                    "type": "object",
                                    "properties": {
                                        "id": { "type": "string" },
                                        "todo": { "$ref": "#/definitions/TodoInputType" }
                                    },
                                    "required": ["id", "todo"]
                                }
                            }
                        },
                        "create_todo": {
                            "type": "object",
                            "properties": {
                                "arguments": {
                                    "type": "object",
                                    "properties": {
                                        "todo": { "$ref": "#/definitions/TodoInputType" }
                                    },
                                    "required": ["todo"]
                                }
                            }
                        },
                        "clear_todos": {
                            "type": "object",
                            "properties": {
                                "return": { "type": "boolean" }
                            }
                        }
                    }
                }
            },
            "definitions": {}
        })
    }

    #[test]
    fn extracts_arguments_excluding_id() {
        let fields =
            mutation_fields(&full_schema(), "update_todo", DEFAULT_EXCLUDED_ARGUMENTS).unwrap();
        assert!(fields.properties.get("id").is_none());
        assert!(fields.properties.get("todo").is_some());
        assert_eq!(fields.required, ["todo"]);
    }

    #[test]
    fn custom_exclusion_list() {
        let fields = mutation_fields(&full_schema(), "update_todo", &[]).unwrap();
        assert_eq!(fields.properties.len(), 2);
        assert_eq!(fields.required, ["id", "todo"]);

        let fields = mutation_fields(&full_schema(), "update_todo", &["id", "todo"]).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn unknown_mutation() {
        let result = mutation_fields(&full_schema(), "delete_todo", DEFAULT_EXCLUDED_ARGUMENTS);
        assert_eq!(
            result,
            Err(MutationError::NotFound {
                name: "delete_todo".into()
            })
        );
    }

    #[test]
    fn mutation_without_arguments() {
        let result = mutation_fields(&full_schema(), "clear_todos", DEFAULT_EXCLUDED_ARGUMENTS);
        assert_eq!(
            result,
            Err(MutationError::NoArguments {
                name: "clear_todos".into()
            })
        );
    }

    #[test]
    fn rejects_schema_without_mutation_root() {
        let result = mutation_fields(&json!({ "definitions": {} }), "create_todo", &[]);
        assert!(matches!(result, Err(MutationError::MalformedSchema { .. })));
    }

    #[test]
    fn lists_mutation_names_in_order() {
        let names = mutation_names(&full_schema()).unwrap();
        assert_eq!(names, ["update_todo", "create_todo", "clear_todos"]);
    }
}
