use std::fs;
use std::path::Path;

use shopfront_core::{ComponentRef, HttpMethod, LayoutSlot, ModuleDescriptor, RouteEntry, SfError};

use super::format::RouteDeclaration;
use crate::errors::{io_error, route_parse_error, Result};

/// Serialization of a route file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFileFormat {
    Yaml,
    Json,
}

impl RouteFileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => RouteFileFormat::Json,
            _ => RouteFileFormat::Yaml,
        }
    }
}

/// Parse and validate one route declaration file of `module`
///
/// # Errors
///
/// Returns `NotFound`/`Io` when the file cannot be read and `InvalidRoute`
/// for malformed or invalid declarations. Every error names the module and
/// the file.
pub fn parse_route_file(module: &ModuleDescriptor, path: &Path) -> Result<RouteEntry> {
    let content = fs::read_to_string(path)
        .map_err(|e| io_error("parse_route_file", path, e).with_module(module.name.clone()))?;
    parse_route_str(module, path, &content, RouteFileFormat::from_path(path))
}

/// Parse route declaration `content` as if read from `path`
///
/// # Errors
///
/// See [`parse_route_file`].
pub fn parse_route_str(
    module: &ModuleDescriptor,
    path: &Path,
    content: &str,
    format: RouteFileFormat,
) -> Result<RouteEntry> {
    let invalid = |reason: String| route_parse_error(&module.name, path, reason);

    let decl: RouteDeclaration = match format {
        RouteFileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| invalid(e.to_string()))?,
        RouteFileFormat::Json => serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?,
    };

    let route_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let id = match decl.id {
        Some(id) => id,
        None => route_dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| invalid("route id missing and not derivable from directory".into()))?,
    };
    let method: HttpMethod = decl.method.parse().map_err(invalid)?;

    let mut entry = RouteEntry::new(id, method, decl.url_pattern, module.name.clone())
        .with_kind(decl.kind)
        .with_handlers(decl.handlers)
        .with_source(path);
    entry.layout = decl.layout.map(|l| LayoutSlot {
        area_id: l.area_id,
        sort_order: l.sort_order,
    });
    for component in decl.components {
        let component_path = if component.path.is_absolute() {
            component.path
        } else {
            route_dir.join(component.path)
        };
        entry = entry.with_component(ComponentRef {
            path: component_path,
            area_id: component.area_id,
            sort_order: component.sort_order,
        });
    }

    entry
        .validate()
        .map_err(|e| SfError::from(e).with_path(path.display().to_string()))?;
    Ok(entry)
}
