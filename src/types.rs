//! Core types for form schema resolution.

use std::convert::Infallible;

use serde_json::{Map, Value};

use crate::error::ResolveError;

/// Keyword holding a reference pointer.
pub const REF_KEY: &str = "$ref";

/// Keyword holding reusable definitions at the schema root.
pub const DEFINITIONS_KEY: &str = "definitions";

/// Pointer prefix accepted by the reference resolver.
pub const DEFINITIONS_POINTER: &str = "#/definitions/";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A schema node classified by shape.
///
/// `R` is the payload of the reference variant. [`SchemaNode`] carries real
/// references; [`ResolvedNode`] uses [`Infallible`] so a resolved tree cannot
/// hold one.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<R> {
    /// A node bearing `$ref`.
    Ref(R),
    /// A node with nested `properties`.
    Object(ObjectNode<R>),
    /// Any other node, carried verbatim.
    Leaf(Value),
}

/// Tree that may still contain references.
pub type SchemaNode = Node<RefNode>;

/// Tree with every reference in the property tree inlined.
pub type ResolvedNode = Node<Infallible>;

/// An unresolved `$ref` together with the keywords written next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RefNode {
    pub pointer: String,
    /// Sibling keywords; these override the resolved definition's keywords.
    pub keywords: Map<String, Value>,
}

/// An object node: its own keywords plus ordered child properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode<R> {
    /// Every keyword except `properties` (`type`, `required`, `title`, ...).
    pub keywords: Map<String, Value>,
    /// Position of `properties` among the keywords, restored on output.
    pub properties_at: usize,
    pub properties: Vec<(String, Node<R>)>,
}

impl SchemaNode {
    /// Classify a JSON schema value.
    ///
    /// `$ref` takes precedence over `properties`. Non-object values
    /// (e.g. boolean schemas) are leaves.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidSchema` if `$ref` is not a string.
    pub fn from_value(value: &Value) -> Result<Self, ResolveError> {
        Self::classify(value, "")
    }

    fn classify(value: &Value, path: &str) -> Result<Self, ResolveError> {
        let Some(map) = value.as_object() else {
            return Ok(Node::Leaf(value.clone()));
        };

        if let Some(pointer) = map.get(REF_KEY) {
            let pointer = pointer.as_str().ok_or_else(|| ResolveError::InvalidSchema {
                message: format!(
                    "$ref at {} must be a string, got {}",
                    display_path(path),
                    json_type_name(pointer)
                ),
            })?;
            let mut keywords = map.clone();
            keywords.shift_remove(REF_KEY);
            return Ok(Node::Ref(RefNode {
                pointer: pointer.to_string(),
                keywords,
            }));
        }

        match map.get("properties") {
            Some(Value::Object(props)) => {
                let properties_at = map.keys().position(|k| k == "properties").unwrap_or(0);
                let mut keywords = map.clone();
                keywords.shift_remove("properties");
                let properties = props
                    .iter()
                    .map(|(name, child)| {
                        let child_path = format!("{}/properties/{}", path, name);
                        Ok((name.clone(), Self::classify(child, &child_path)?))
                    })
                    .collect::<Result<Vec<_>, ResolveError>>()?;
                Ok(Node::Object(ObjectNode {
                    keywords,
                    properties_at,
                    properties,
                }))
            }
            _ => Ok(Node::Leaf(value.clone())),
        }
    }
}

impl ResolvedNode {
    /// Convert back into a JSON schema value.
    pub fn into_value(self) -> Value {
        match self {
            Node::Ref(never) => match never {},
            Node::Leaf(value) => value,
            Node::Object(object) => {
                let mut properties = Some(Value::Object(
                    object
                        .properties
                        .into_iter()
                        .map(|(name, child)| (name, child.into_value()))
                        .collect(),
                ));
                let mut map = Map::with_capacity(object.keywords.len() + 1);
                for (index, (key, value)) in object.keywords.into_iter().enumerate() {
                    if index == object.properties_at {
                        if let Some(props) = properties.take() {
                            map.insert("properties".to_string(), props);
                        }
                    }
                    map.insert(key, value);
                }
                if let Some(props) = properties {
                    map.insert("properties".to_string(), props);
                }
                Value::Object(map)
            }
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
