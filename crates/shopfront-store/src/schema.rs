//! Declarative config schema contributions
//!
//! A module may ship `config.schema.json` (or `.yaml`/`.yml`) at its root.
//! The loader merges it into the application schema before running the
//! module's compiled bootstrap.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use shopfront_core::ModuleDescriptor;

use crate::errors::{io_error, schema_error, Result};

pub const SCHEMA_FILE_NAMES: [&str; 3] =
    ["config.schema.json", "config.schema.yaml", "config.schema.yml"];

/// First schema file present under the module root
pub fn schema_file(module: &ModuleDescriptor) -> Option<PathBuf> {
    SCHEMA_FILE_NAMES
        .iter()
        .map(|name| module.root.join(name))
        .find(|p| p.is_file())
}

/// Load the module's schema contribution, if it has one
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `InvalidSchema` if it does
/// not parse to a JSON object.
pub fn load_schema_contribution(module: &ModuleDescriptor) -> Result<Option<Value>> {
    let Some(path) = schema_file(module) else {
        return Ok(None);
    };
    let content = fs::read_to_string(&path)
        .map_err(|e| io_error("load_schema_contribution", &path, e).with_module(module.name.clone()))?;

    let value: Value = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&content).map_err(|e| schema_error(&module.name, &path, e.to_string()))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| schema_error(&module.name, &path, e.to_string()))?
    };
    if !value.is_object() {
        return Err(schema_error(
            &module.name,
            &path,
            "schema contribution must be a mapping",
        ));
    }
    Ok(Some(value))
}
