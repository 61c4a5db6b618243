//! Form configuration records.
//!
//! A configuration is either *manual* (the caller supplies the schema) or
//! *mutation* (the schema is generated from a remote write operation's
//! arguments). Both carry the same optional modifiers:
//!
//! ```json
//! {
//!   "mutation": { "name": "create_todo", "variables": { "listId": "l1" } },
//!   "ignoreFields": ["todo.completed"],
//!   "requiredFields": ["todo.name"],
//!   "updateFields": { "todo.name": { "title": "Name" } },
//!   "augment": { "title": "New todo" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::FieldPath;

/// A complete form configuration: schema source plus modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(flatten)]
    pub source: FormSource,
    #[serde(flatten)]
    pub modifiers: BaseModifiers,
}

/// Where the form's fields come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormSource {
    /// Fields taken verbatim from a caller-supplied schema.
    Manual { schema: Value },
    /// Fields generated from a named mutation's declared arguments.
    Mutation(MutationConfig),
}

/// Mutation-backed form settings forwarded to the write executor on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationConfig {
    pub name: String,
    /// Extra variables merged over the cleaned form data (these win).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refetch_queries: Vec<RefetchQuery>,
}

/// A query to refetch after a successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefetchQuery {
    /// Refetch an active query by operation name.
    Named(String),
    /// Full query options, passed through untouched.
    Options(Map<String, Value>),
}

/// Schema modifiers, applied in order: ignore, update, require, augment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseModifiers {
    /// Fields to remove, e.g. `["user.id"]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_fields: Vec<FieldPath>,
    /// Fields to mark required, e.g. `["user.email"]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<FieldPath>,
    /// Partial nodes merged into existing fields, keyed by field path.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub update_fields: Map<String, Value>,
    /// Partial schema merged at the root, last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub augment: Option<Value>,
}

impl FormConfig {
    pub fn manual(schema: Value) -> Self {
        Self {
            source: FormSource::Manual { schema },
            modifiers: BaseModifiers::default(),
        }
    }

    pub fn mutation(name: impl Into<String>) -> Self {
        Self {
            source: FormSource::Mutation(MutationConfig::new(name)),
            modifiers: BaseModifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: BaseModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Name of the backing mutation, if any.
    pub fn mutation_name(&self) -> Option<&str> {
        match &self.source {
            FormSource::Mutation(m) => Some(&m.name),
            FormSource::Manual { .. } => None,
        }
    }

    /// True when switching from `previous` to `self` requires rebuilding the effective schema.
    ///
    /// Only the schema source counts: a different mutation name, a different
    /// manual schema, or a change of kind.
    pub fn source_changed(&self, previous: &FormConfig) -> bool {
        match (&self.source, &previous.source) {
            (FormSource::Mutation(a), FormSource::Mutation(b)) => a.name != b.name,
            (FormSource::Manual { schema: a }, FormSource::Manual { schema: b }) => a != b,
            _ => true,
        }
    }
}

impl MutationConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: None,
            context: None,
            refetch_queries: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_mutation_config() {
        let config: FormConfig = serde_json::from_value(json!({
            "mutation": {
                "name": "create_todo",
                "variables": { "listId": "l1" },
                "refetchQueries": ["todos", { "query": "query Todos { todos { id } }" }]
            },
            "ignoreFields": ["todo.completed"],
            "updateFields": { "todo.name": { "title": "Name" } }
        }))
        .unwrap();

        assert_eq!(config.mutation_name(), Some("create_todo"));
        let FormSource::Mutation(mutation) = &config.source else {
            panic!("expected mutation source");
        };
        assert_eq!(mutation.refetch_queries[0], RefetchQuery::Named("todos".into()));
        assert!(matches!(mutation.refetch_queries[1], RefetchQuery::Options(_)));
        assert_eq!(config.modifiers.ignore_fields[0].to_string(), "todo.completed");
        assert!(config.modifiers.update_fields.contains_key("todo.name"));
        assert!(config.modifiers.augment.is_none());
    }

    #[test]
    fn deserialize_manual_config() {
        let config: FormConfig = serde_json::from_value(json!({
            "manual": { "schema": { "properties": { "email": { "type": "string" } } } },
            "requiredFields": ["email"]
        }))
        .unwrap();
        assert_eq!(config.mutation_name(), None);
        assert_eq!(config.modifiers.required_fields.len(), 1);
    }

    #[test]
    fn malformed_field_path_rejected_at_entry() {
        let result: Result<FormConfig, _> = serde_json::from_value(json!({
            "mutation": { "name": "create_todo" },
            "ignoreFields": ["todo."]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn config_without_source_rejected() {
        let result: Result<FormConfig, _> =
            serde_json::from_value(json!({ "ignoreFields": ["id"] }));
        assert!(result.is_err());
    }

    #[test]
    fn source_change_detection() {
        let create = FormConfig::mutation("create_todo");
        let mut create_with_vars = FormConfig::mutation("create_todo");
        if let FormSource::Mutation(m) = &mut create_with_vars.source {
            m.variables = Some(Map::new());
        }
        let update = FormConfig::mutation("update_todo");
        let manual = FormConfig::manual(json!({ "properties": {} }));

        assert!(!create_with_vars.source_changed(&create));
        assert!(update.source_changed(&create));
        assert!(manual.source_changed(&create));
        assert!(!manual.source_changed(&manual.clone()));
        assert!(FormConfig::manual(json!({ "properties": { "a": {} } })).source_changed(&manual));
    }
}
