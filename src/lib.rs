//! Form Schema Resolver
//!
//! Turns a full structural schema plus a per-form configuration into the
//! schemas and data a mutation-driven form needs.
//!
//! - [`schema_from_config`] builds the *effective schema*: fields from a
//!   manual schema or a mutation's arguments, `$ref`s inlined, modifiers
//!   applied.
//! - [`apply_conditions`] prunes it against live data using `ui:if`
//!   visibility rules.
//! - [`clean_data`] strips data fields the current schema does not declare.
//!
//! # Example
//!
//! ```
//! use form_schema::{apply_conditions, clean_data, schema_from_config, FormConfig};
//! use serde_json::json;
//!
//! let full = json!({
//!     "properties": {
//!         "Mutation": {
//!             "properties": {
//!                 "signup": {
//!                     "properties": {
//!                         "arguments": {
//!                             "type": "object",
//!                             "properties": {
//!                                 "referAFriend": { "type": "boolean" },
//!                                 "friendName": { "type": "string" }
//!                             }
//!                         }
//!                     }
//!                 }
//!             }
//!         }
//!     },
//!     "definitions": {}
//! });
//!
//! let schema = schema_from_config(&full, &FormConfig::mutation("signup"), None).unwrap();
//!
//! let ui = json!({ "friendName": { "ui:if": { "referAFriend": true } } });
//! let data = json!({ "referAFriend": false, "friendName": "Ada" });
//! let pruned = apply_conditions(&schema, &ui, &data);
//! assert!(pruned["properties"].get("friendName").is_none());
//!
//! let cleaned = clean_data(&data, &pruned["properties"]);
//! assert_eq!(cleaned, json!({ "referAFriend": false }));
//! ```
//!
//! # Modifiers
//!
//! | Modifier | Effect | Order |
//! |----------|--------|-------|
//! | `ignoreFields` | Remove field and its `required` entry | 1 |
//! | `updateFields` | Deep-merge a partial node into the field | 2 |
//! | `requiredFields` | Append to the parent's `required` list | 3 |
//! | `augment` | Deep-merge a partial schema at the root | 4 |
//!
//! Merging recurses into objects only; arrays (`required`, `enum`) are
//! replaced wholesale.

mod compose;
mod conditions;
mod config;
mod editor;
mod error;
mod form;
mod loader;
mod mutation;
mod path;
mod resolver;
mod sanitize;
mod types;
mod validator;

pub use compose::schema_from_config;
pub use conditions::{apply_conditions, is_visible, UI_IF};
pub use config::{BaseModifiers, FormConfig, FormSource, MutationConfig, RefetchQuery};
pub use editor::{augment, deep_merge, exclude, set_required, update};
pub use error::{MutationError, PathError, ResolveError, SchemaError, ValidateError};
pub use form::{FormEngine, FormStatus, MutationRequest, Submission};
pub use loader::{load_config, load_config_str, load_schema, load_schema_str};
pub use mutation::{mutation_fields, mutation_names, MutationFields, DEFAULT_EXCLUDED_ARGUMENTS};
pub use path::FieldPath;
pub use resolver::{flatten, lookup_definition};
pub use sanitize::{clean_data, clean_data_at};
pub use types::{Node, ObjectNode, RefNode, ResolvedNode, SchemaNode};
pub use validator::{validate, validate_against_schema};
