//! Form data validation against effective schemas.

use serde_json::Value;

use crate::compose::schema_from_config;
use crate::config::FormConfig;
use crate::error::{ResolveError, SchemaError, ValidateError};

/// Validate form data against the effective schema of a configuration.
///
/// Builds the effective schema, then validates `payload` against it.
///
/// # Errors
///
/// Returns `ValidateError::Resolve` if the schema cannot be built, or
/// `ValidateError::Invalid` if the payload doesn't match the schema.
pub fn validate(
    full_schema: &Value,
    config: &FormConfig,
    payload: &Value,
) -> Result<(), ValidateError> {
    let schema = schema_from_config(full_schema, config, None)?;
    validate_against_schema(&schema, payload)
}

/// Validate a payload against an already-built schema.
///
/// Use this with an effective or conditionally pruned schema when the
/// schema is rebuilt less often than the data changes.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| {
        ValidateError::Resolve(ResolveError::InvalidSchema {
            message: e.to_string(),
        })
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(payload)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_schema() -> Value {
        json!({
            "properties": {
                "Mutation": {
                    "properties": {
                        "create_todo": {
                            "properties": {
                                "arguments": {
                                    "type": "object",
                                    "properties": {
                                        "name": { "type": "string" },
                                        "completed": { "type": "boolean" }
                                    },
                                    "required": ["name"]
                                }
                            }
                        }
                    }
                }
            },
            "definitions": {}
        })
    }

    #[test]
    fn validate_valid_payload() {
        let payload = json!({ "name": "Buy milk", "completed": false });
        let result = validate(&full_schema(), &FormConfig::mutation("create_todo"), &payload);
        assert!(result.is_ok());
    }

    #[test]
    fn validate_missing_required_field() {
        let payload = json!({ "completed": true });
        let result = validate(&full_schema(), &FormConfig::mutation("create_todo"), &payload);
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn validate_wrong_type() {
        let payload = json!({ "name": 123 });
        let result = validate(&full_schema(), &FormConfig::mutation("create_todo"), &payload);
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn validate_resolve_failure() {
        let result = validate(
            &json!({}),
            &FormConfig::mutation("create_todo"),
            &json!({}),
        );
        assert!(matches!(result, Err(ValidateError::Resolve(_))));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "number" }
            },
            "required": ["name", "age"]
        });
        match validate_against_schema(&schema, &json!({})) {
            Err(ValidateError::Invalid { errors }) => assert_eq!(errors.len(), 2),
            _ => panic!("expected validation error with 2 errors"),
        }
    }
}
