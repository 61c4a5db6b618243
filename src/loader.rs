//! Loading full schemas and form configurations from JSON sources.

use std::path::Path;

use serde_json::Value;

use crate::config::FormConfig;
use crate::error::ResolveError;

/// Load a schema from a file path.
///
/// # Errors
///
/// Returns `ResolveError::FileNotFound` if the file doesn't exist,
/// or `ResolveError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, ResolveError> {
    let content = read_file(path)?;
    load_schema_str(&content)
}

/// Load a schema from a JSON string.
///
/// # Errors
///
/// Returns `ResolveError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, ResolveError> {
    serde_json::from_str(content).map_err(|source| ResolveError::InvalidJson { source })
}

/// Load a form configuration from a file path.
///
/// # Errors
///
/// Returns `ResolveError::FileNotFound` if the file doesn't exist, or
/// `ResolveError::InvalidJson` if it isn't a valid configuration (including
/// malformed field paths).
pub fn load_config(path: &Path) -> Result<FormConfig, ResolveError> {
    let content = read_file(path)?;
    load_config_str(&content)
}

/// Load a form configuration from a JSON string.
///
/// # Errors
///
/// Returns `ResolveError::InvalidJson` if the string isn't a valid configuration.
pub fn load_config_str(content: &str) -> Result<FormConfig, ResolveError> {
    serde_json::from_str(content).map_err(|source| ResolveError::InvalidJson { source })
}

fn read_file(path: &Path) -> Result<String, ResolveError> {
    if !path.exists() {
        return Err(ResolveError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| ResolveError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}
