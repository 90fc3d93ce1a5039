//! On-disk shape of a route declaration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shopfront_core::RouteKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutDeclaration {
    pub area_id: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComponentDeclaration {
    /// Relative to the route file's directory
    pub path: PathBuf,
    pub area_id: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// A route declaration file
///
/// ```yaml
/// id: productView            # defaults to the route directory name
/// urlPattern: /product/:id
/// method: GET
/// kind: page                 # page | api
/// handlers: [catalog/loadProduct]
/// layout: { areaId: content, sortOrder: 10 }
/// components:
///   - { path: ProductView.jsx, areaId: content, sortOrder: 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouteDeclaration {
    #[serde(default)]
    pub id: Option<String>,
    pub url_pattern: String,
    pub method: String,
    #[serde(default)]
    pub kind: RouteKind,
    #[serde(default)]
    pub handlers: Vec<String>,
    #[serde(default)]
    pub layout: Option<LayoutDeclaration>,
    #[serde(default)]
    pub components: Vec<ComponentDeclaration>,
}
