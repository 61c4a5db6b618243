//! Reference resolution - inlines `$ref` pointers in a schema's property tree.

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::types::{
    Node, ObjectNode, RefNode, ResolvedNode, SchemaNode, DEFINITIONS_KEY, DEFINITIONS_POINTER,
};

/// Resolve every `$ref` in `schema.properties`, at any depth.
///
/// Each reference is replaced by a deep copy of its definition from the
/// root `definitions` map. Keywords written next to `$ref` override the
/// definition's own. Root keywords (including `definitions`) are copied
/// unchanged; the input is never mutated.
///
/// # Errors
///
/// Returns `ResolveError::UnresolvedReference` if a pointer has no matching
/// definition, `UnsupportedPointer` for pointers outside `#/definitions/`,
/// and `CircularReference` when a definition contains itself.
pub fn flatten(schema: &Value) -> Result<Value, ResolveError> {
    let empty = Map::new();
    let definitions = schema
        .get(DEFINITIONS_KEY)
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    match SchemaNode::from_value(schema)? {
        Node::Object(root) => {
            let resolver = RefResolver { definitions };
            let resolved = resolver.resolve_object(root, &mut Vec::new())?;
            Ok(Node::Object(resolved).into_value())
        }
        // Only the property tree is walked; a root without properties is returned as-is.
        Node::Ref(_) | Node::Leaf(_) => Ok(schema.clone()),
    }
}

/// Look up a `#/definitions/...` pointer in a definitions map.
///
/// Segments after the definition name walk into the definition
/// (e.g. `#/definitions/Todo/properties/name`). JSON Pointer escapes
/// (`~1` = `/`, `~0` = `~`) are honoured.
pub fn lookup_definition<'a>(
    definitions: &'a Map<String, Value>,
    pointer: &str,
) -> Result<&'a Value, ResolveError> {
    let path =
        pointer
            .strip_prefix(DEFINITIONS_POINTER)
            .ok_or_else(|| ResolveError::UnsupportedPointer {
                pointer: pointer.to_string(),
            })?;

    let mut parts = path.split('/').map(unescape);
    let name = parts.next().unwrap_or_default();
    let mut current = definitions
        .get(&name)
        .ok_or_else(|| ResolveError::UnresolvedReference {
            pointer: pointer.to_string(),
        })?;

    for key in parts {
        current = current
            .get(&key)
            .ok_or_else(|| ResolveError::UnresolvedReference {
                pointer: pointer.to_string(),
            })?;
    }
    Ok(current)
}

// --- Internal implementation ---

struct RefResolver<'a> {
    definitions: &'a Map<String, Value>,
}

impl RefResolver<'_> {
    /// `stack` holds the pointers currently being expanded, to detect cycles.
    fn resolve_node(
        &self,
        node: SchemaNode,
        stack: &mut Vec<String>,
    ) -> Result<ResolvedNode, ResolveError> {
        match node {
            Node::Leaf(value) => Ok(Node::Leaf(value)),
            Node::Object(object) => Ok(Node::Object(self.resolve_object(object, stack)?)),
            Node::Ref(reference) => self.resolve_ref(reference, stack),
        }
    }

    fn resolve_object(
        &self,
        object: ObjectNode<RefNode>,
        stack: &mut Vec<String>,
    ) -> Result<ObjectNode<std::convert::Infallible>, ResolveError> {
        let properties = object
            .properties
            .into_iter()
            .map(|(name, child)| Ok((name, self.resolve_node(child, stack)?)))
            .collect::<Result<Vec<_>, ResolveError>>()?;
        Ok(ObjectNode {
            keywords: object.keywords,
            properties_at: object.properties_at,
            properties,
        })
    }

    fn resolve_ref(
        &self,
        reference: RefNode,
        stack: &mut Vec<String>,
    ) -> Result<ResolvedNode, ResolveError> {
        if stack.contains(&reference.pointer) {
            return Err(ResolveError::CircularReference {
                pointer: reference.pointer,
            });
        }

        let target = lookup_definition(self.definitions, &reference.pointer)?;
        let merged = match target {
            Value::Object(definition) => {
                let mut merged = definition.clone();
                for (key, value) in reference.keywords {
                    merged.insert(key, value);
                }
                Value::Object(merged)
            }
            // Non-object definitions (boolean schemas) have nothing to merge into.
            other => other.clone(),
        };

        stack.push(reference.pointer);
        let resolved = SchemaNode::from_value(&merged).and_then(|node| self.resolve_node(node, stack));
        stack.pop();
        resolved
    }
}

fn unescape(part: &str) -> String {
    part.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn todo_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "todo": { "$ref": "#/definitions/TodoInput" }
            },
            "definitions": {
                "TodoInput": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "completed": { "type": "boolean" }
                    }
                }
            }
        })
    }

    #[test]
    fn flatten_inlines_reference() {
        let result = flatten(&todo_schema()).unwrap();
        let todo = &result["properties"]["todo"];
        assert!(todo.get("$ref").is_none());
        assert_eq!(todo["required"], json!(["name"]));
        assert_eq!(todo["properties"]["completed"], json!({ "type": "boolean" }));
    }

    #[test]
    fn flatten_keeps_definitions_at_root() {
        let schema = todo_schema();
        let result = flatten(&schema).unwrap();
        assert_eq!(result["definitions"], schema["definitions"]);
    }

    #[test]
    fn flatten_does_not_mutate_input() {
        let schema = todo_schema();
        let before = schema.clone();
        let _ = flatten(&schema).unwrap();
        assert_eq!(schema, before);
    }

    #[test]
    fn flatten_resolves_nested_references() {
        let schema = json!({
            "properties": {
                "order": {
                    "type": "object",
                    "properties": {
                        "customer": { "$ref": "#/definitions/Customer" }
                    }
                }
            },
            "definitions": {
                "Customer": {
                    "type": "object",
                    "properties": {
                        "address": { "$ref": "#/definitions/Address" }
                    }
                },
                "Address": {
                    "type": "object",
                    "properties": { "city": { "type": "string" } }
                }
            }
        });
        let result = flatten(&schema).unwrap();
        assert_eq!(
            result["properties"]["order"]["properties"]["customer"]["properties"]["address"]
                ["properties"]["city"],
            json!({ "type": "string" })
        );
    }

    #[test]
    fn flatten_follows_reference_chains() {
        let schema = json!({
            "properties": { "status": { "$ref": "#/definitions/Alias" } },
            "definitions": {
                "Alias": { "$ref": "#/definitions/Status" },
                "Status": { "type": "string", "enum": ["open", "done"] }
            }
        });
        let result = flatten(&schema).unwrap();
        assert_eq!(
            result["properties"]["status"],
            json!({ "type": "string", "enum": ["open", "done"] })
        );
    }

    #[test]
    fn sibling_keywords_override_definition() {
        let schema = json!({
            "properties": {
                "status": { "$ref": "#/definitions/Status", "title": "Current status" }
            },
            "definitions": {
                "Status": { "type": "string", "title": "Status" }
            }
        });
        let result = flatten(&schema).unwrap();
        assert_eq!(result["properties"]["status"]["title"], "Current status");
        assert_eq!(result["properties"]["status"]["type"], "string");
    }

    #[test]
    fn unresolved_reference_names_pointer() {
        let schema = json!({
            "properties": { "todo": { "$ref": "#/definitions/Missing" } },
            "definitions": {}
        });
        let result = flatten(&schema);
        assert!(matches!(
            result,
            Err(ResolveError::UnresolvedReference { pointer }) if pointer == "#/definitions/Missing"
        ));
    }

    #[test]
    fn missing_definitions_map_is_unresolved() {
        let schema = json!({
            "properties": { "todo": { "$ref": "#/definitions/Todo" } }
        });
        assert!(matches!(
            flatten(&schema),
            Err(ResolveError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn foreign_pointer_is_unsupported() {
        let schema = json!({
            "properties": { "todo": { "$ref": "other.json#/Todo" } }
        });
        assert!(matches!(
            flatten(&schema),
            Err(ResolveError::UnsupportedPointer { .. })
        ));
    }

    #[test]
    fn self_referencing_definition_is_circular() {
        let schema = json!({
            "properties": { "node": { "$ref": "#/definitions/Node" } },
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": { "parent": { "$ref": "#/definitions/Node" } }
                }
            }
        });
        assert!(matches!(
            flatten(&schema),
            Err(ResolveError::CircularReference { pointer }) if pointer == "#/definitions/Node"
        ));
    }

    #[test]
    fn same_definition_twice_is_not_circular() {
        let schema = json!({
            "properties": {
                "billing": { "$ref": "#/definitions/Address" },
                "shipping": { "$ref": "#/definitions/Address" }
            },
            "definitions": {
                "Address": { "type": "object", "properties": { "city": { "type": "string" } } }
            }
        });
        let result = flatten(&schema).unwrap();
        assert_eq!(result["properties"]["billing"], result["properties"]["shipping"]);
    }

    #[test]
    fn lookup_walks_into_definition() {
        let defs = todo_schema()["definitions"].as_object().unwrap().clone();
        let name = lookup_definition(&defs, "#/definitions/TodoInput/properties/name").unwrap();
        assert_eq!(name, &json!({ "type": "string" }));
    }

    #[test]
    fn lookup_unescapes_pointer() {
        let defs = json!({ "a/b": { "type": "string" } })
            .as_object()
            .unwrap()
            .clone();
        assert!(lookup_definition(&defs, "#/definitions/a~1b").is_ok());
    }

    #[test]
    fn schema_without_properties_is_unchanged() {
        let schema = json!({ "type": "string" });
        assert_eq!(flatten(&schema).unwrap(), schema);
    }
}
