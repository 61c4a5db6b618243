//! Effective schema composition from a form configuration.
//!
//! The pipeline is:
//!
//! 1. Pick the fields: a manual schema's properties, or a mutation's arguments
//! 2. Wrap them in a root object carrying the full schema's `definitions`
//! 3. Inline every `$ref` ([`flatten`])
//! 4. Apply `ignoreFields`, then `updateFields`, then `requiredFields`
//! 5. Merge `augment` last, so caller overrides win over every modifier
//!
//! Exclusion runs before required-field marking so the required-list
//! fix-ups never fight explicit additions.

use serde_json::{json, Map, Value};

use crate::config::{BaseModifiers, FormConfig, FormSource};
use crate::editor::{exclude_in_place, merge_into, set_required_in_place, update_in_place};
use crate::error::ResolveError;
use crate::mutation::{mutation_fields, MutationFields, DEFAULT_EXCLUDED_ARGUMENTS};
use crate::path::FieldPath;
use crate::resolver::flatten;
use crate::types::{json_type_name, DEFINITIONS_KEY};

/// Build the effective schema for a form configuration.
///
/// An unknown mutation, or one without arguments, is logged and yields a
/// schema with no properties rather than an error.
///
/// # Errors
///
/// Returns `ResolveError` if the full schema has the wrong shape, a
/// reference cannot be resolved, or a modifier addresses a missing parent.
pub fn schema_from_config(
    full_schema: &Value,
    config: &FormConfig,
    title: Option<&str>,
) -> Result<Value, ResolveError> {
    let full_definitions = match full_schema.get(DEFINITIONS_KEY) {
        None => Map::new(),
        Some(Value::Object(defs)) => defs.clone(),
        Some(other) => {
            return Err(ResolveError::InvalidSchema {
                message: format!(
                    "definitions must be an object, got {}",
                    json_type_name(other)
                ),
            })
        }
    };

    let (fields, definitions) = match &config.source {
        FormSource::Manual { schema } => manual_fields(schema, full_definitions)?,
        FormSource::Mutation(mutation) => {
            let fields = match mutation_fields(full_schema, &mutation.name, DEFAULT_EXCLUDED_ARGUMENTS)
            {
                Ok(fields) => fields,
                Err(err) if err.is_degraded() => {
                    tracing::warn!(mutation = %mutation.name, error = %err, "rendering empty form");
                    MutationFields::default()
                }
                Err(err) => return Err(err.into()),
            };
            (fields, full_definitions)
        }
    };

    let mut root = json!({
        "type": "object",
        "properties": Value::Object(fields.properties),
        "required": fields.required,
        "definitions": Value::Object(definitions),
    });
    if let (Some(title), Some(map)) = (title, root.as_object_mut()) {
        map.insert("title".to_string(), Value::String(title.to_string()));
    }

    let mut schema = flatten(&root)?;
    apply_modifiers(&mut schema, &config.modifiers)?;

    let field_count = schema
        .get("properties")
        .and_then(Value::as_object)
        .map_or(0, Map::len);
    tracing::debug!(
        mutation = config.mutation_name().unwrap_or("<manual>"),
        fields = field_count,
        "built effective schema"
    );
    Ok(schema)
}

fn manual_fields(
    schema: &Value,
    mut definitions: Map<String, Value>,
) -> Result<(MutationFields, Map<String, Value>), ResolveError> {
    let properties = match schema.get("properties") {
        None => Map::new(),
        Some(Value::Object(props)) => props.clone(),
        Some(other) => {
            return Err(ResolveError::InvalidSchema {
                message: format!(
                    "manual schema properties must be an object, got {}",
                    json_type_name(other)
                ),
            })
        }
    };
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    // A manual schema's own definitions extend (and shadow) the full schema's.
    if let Some(own) = schema.get(DEFINITIONS_KEY).and_then(Value::as_object) {
        for (name, def) in own {
            definitions.insert(name.clone(), def.clone());
        }
    }

    Ok((
        MutationFields {
            properties,
            required,
        },
        definitions,
    ))
}

fn apply_modifiers(schema: &mut Value, modifiers: &BaseModifiers) -> Result<(), ResolveError> {
    for path in &modifiers.ignore_fields {
        exclude_in_place(schema, path);
    }

    for (field, partial) in &modifiers.update_fields {
        let path = FieldPath::parse(field)?;
        update_in_place(schema, &path, partial)?;
    }

    for path in &modifiers.required_fields {
        set_required_in_place(schema, path)?;
    }

    if let Some(augment) = &modifiers.augment {
        merge_into(schema, augment);
    }

    Ok(())
}
