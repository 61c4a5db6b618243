//! Form session state - keeps the effective and pruned schemas in step with
//! configuration and data changes.
//!
//! The effective schema is rebuilt only when the configuration's schema
//! source changes; the pruned schema is rebuilt on every data change.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::compose::schema_from_config;
use crate::conditions::apply_conditions;
use crate::config::{FormConfig, FormSource, RefetchQuery};
use crate::error::{ResolveError, ValidateError};
use crate::sanitize::clean_data;
use crate::validator::validate_against_schema;

/// What the embedding layer should send on save.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Submission {
    /// Call the write executor with this request.
    Mutation(MutationRequest),
    /// Hand the raw form data to the manual save callback.
    Manual { data: Value },
}

/// A ready-to-execute mutation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRequest {
    pub name: String,
    /// Cleaned form data with the configuration's variables merged over it.
    pub variables: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub refetch_queries: Vec<RefetchQuery>,
}

/// Dirty/saved/error flags of a form session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStatus {
    pub is_dirty: bool,
    pub is_saved: bool,
    pub has_error: bool,
}

/// A live form: configuration, UI map, data and the schemas derived from them.
#[derive(Debug, Clone)]
pub struct FormEngine {
    full_schema: Value,
    config: FormConfig,
    ui: Value,
    title: Option<String>,
    schema: Value,
    pruned: Value,
    data: Value,
    status: FormStatus,
}

impl FormEngine {
    /// Build a session, computing the effective and pruned schemas.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the effective schema cannot be built.
    pub fn new(
        full_schema: Value,
        config: FormConfig,
        ui: Value,
        data: Value,
    ) -> Result<Self, ResolveError> {
        Self::with_title(full_schema, config, ui, data, None)
    }

    /// Like [`FormEngine::new`], setting the effective schema's `title`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the effective schema cannot be built.
    pub fn with_title(
        full_schema: Value,
        config: FormConfig,
        ui: Value,
        data: Value,
        title: Option<String>,
    ) -> Result<Self, ResolveError> {
        let schema = schema_from_config(&full_schema, &config, title.as_deref())?;
        let pruned = apply_conditions(&schema, &ui, &data);
        Ok(Self {
            full_schema,
            config,
            ui,
            title,
            schema,
            pruned,
            data,
            status: FormStatus::default(),
        })
    }

    /// Swap the configuration, rebuilding the effective schema only if its source changed.
    ///
    /// Returns whether a rebuild happened. On error the session is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the new effective schema cannot be built.
    pub fn set_config(&mut self, config: FormConfig) -> Result<bool, ResolveError> {
        if !config.source_changed(&self.config) {
            self.config = config;
            return Ok(false);
        }

        let schema = schema_from_config(&self.full_schema, &config, self.title.as_deref())?;
        tracing::debug!(
            mutation = config.mutation_name().unwrap_or("<manual>"),
            "schema source changed, rebuilt effective schema"
        );
        self.pruned = apply_conditions(&schema, &self.ui, &self.data);
        self.schema = schema;
        self.config = config;
        Ok(true)
    }

    /// Record a data change event: recompute the pruned schema and the error flag.
    pub fn set_data(&mut self, data: Value) {
        self.pruned = apply_conditions(&self.schema, &self.ui, &data);
        self.data = data;
        self.status = FormStatus {
            is_dirty: true,
            is_saved: false,
            has_error: self.validate().is_err(),
        };
    }

    /// Replace the UI map and recompute the pruned schema.
    pub fn set_ui(&mut self, ui: Value) {
        self.pruned = apply_conditions(&self.schema, &ui, &self.data);
        self.ui = ui;
    }

    /// Validate current data against the pruned schema.
    ///
    /// # Errors
    ///
    /// Returns `ValidateError::Invalid` listing every violation.
    pub fn validate(&self) -> Result<(), ValidateError> {
        validate_against_schema(&self.pruned, &self.data)
    }

    /// Current data cleaned against the pruned schema.
    pub fn cleaned_data(&self) -> Value {
        let empty = Value::Object(Map::new());
        let properties = self.pruned.get("properties").unwrap_or(&empty);
        clean_data(&self.data, properties)
    }

    /// Build the payload for the save path.
    pub fn submission(&self) -> Submission {
        match &self.config.source {
            FormSource::Manual { .. } => Submission::Manual {
                data: self.data.clone(),
            },
            FormSource::Mutation(mutation) => {
                let mut variables = match self.cleaned_data() {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                if let Some(extra) = &mutation.variables {
                    for (key, value) in extra {
                        variables.insert(key.clone(), value.clone());
                    }
                }
                Submission::Mutation(MutationRequest {
                    name: mutation.name.clone(),
                    variables,
                    context: mutation.context.clone(),
                    refetch_queries: mutation.refetch_queries.clone(),
                })
            }
        }
    }

    /// Record a successful save.
    pub fn mark_saved(&mut self) {
        self.status = FormStatus {
            is_dirty: false,
            is_saved: true,
            has_error: false,
        };
    }

    pub fn effective_schema(&self) -> &Value {
        &self.schema
    }

    pub fn pruned_schema(&self) -> &Value {
        &self.pruned
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }
}
