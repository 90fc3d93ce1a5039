//! Error handling for shopfront-store
//!
//! Store operations return the canonical `SfError`; these helpers attach the
//! operation and path every filesystem failure must report.

use std::path::Path;

use shopfront_core::errors::{SfError, SfErrorKind};

/// Result type alias using SfError
pub type Result<T> = std::result::Result<T, SfError>;

/// Create an IO error for `path`
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> SfError {
    let kind = if err.kind() == std::io::ErrorKind::NotFound {
        SfErrorKind::NotFound
    } else {
        SfErrorKind::Io
    };
    SfError::new(kind)
        .with_op(operation)
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}

/// Create an application config error
pub fn config_error(path: &Path, reason: impl Into<String>) -> SfError {
    SfError::new(SfErrorKind::InvalidConfig)
        .with_op("load_app_config")
        .with_path(path.display().to_string())
        .with_message(reason)
}

/// Create a route declaration parse error
pub fn route_parse_error(module: &str, path: &Path, reason: impl Into<String>) -> SfError {
    SfError::new(SfErrorKind::InvalidRoute)
        .with_op("parse_route_file")
        .with_module(module)
        .with_path(path.display().to_string())
        .with_message(reason)
}

/// Create a schema contribution error
pub fn schema_error(module: &str, path: &Path, reason: impl Into<String>) -> SfError {
    SfError::new(SfErrorKind::InvalidSchema)
        .with_op("load_schema_contribution")
        .with_module(module)
        .with_path(path.display().to_string())
        .with_message(reason)
}

/// Create a build manifest error
pub fn manifest_error(path: &Path, reason: impl Into<String>) -> SfError {
    SfError::new(SfErrorKind::InvalidManifest)
        .with_op("load_manifest")
        .with_path(path.display().to_string())
        .with_message(reason)
}
