//! Error types for form schema resolution, editing and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,

    #[error("field path \"{path}\" has an empty segment")]
    EmptySegment { path: String },
}

/// Errors while building an effective schema.
#[derive(Debug, Error)]
pub enum ResolveError {
    // IO errors
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Schema errors
    #[error("unresolved reference \"{pointer}\": no matching definition")]
    UnresolvedReference { pointer: String },

    #[error("unsupported reference \"{pointer}\": expected #/definitions/<name>")]
    UnsupportedPointer { pointer: String },

    #[error("circular reference \"{pointer}\" in property tree")]
    CircularReference { pointer: String },

    #[error("no schema node at \"{path}\" (missing segment \"{segment}\")")]
    PathNotFound { path: String, segment: String },

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
}

/// Errors while extracting the argument schema of a named mutation.
///
/// `NotFound` and `NoArguments` degrade to an empty form; `MalformedSchema`
/// means the full schema does not have the expected shape at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("unknown mutation {name}")]
    NotFound { name: String },

    #[error("mutation {name} has no arguments")]
    NoArguments { name: String },

    #[error("malformed schema: {message}")]
    MalformedSchema { message: String },
}

impl MutationError {
    /// Returns true when the error should degrade to an empty result rather than fail.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoArguments { .. })
    }
}

impl From<MutationError> for ResolveError {
    fn from(err: MutationError) -> Self {
        ResolveError::InvalidSchema {
            message: err.to_string(),
        }
    }
}

/// Errors during validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
