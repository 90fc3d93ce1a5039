//! Route entries and the global route table
//!
//! The table is keyed by (method, pattern). Inserting an existing key replaces
//! the previous entry wholesale (last writer wins, no handler merging) while
//! the key keeps its original position, so iteration order reflects first
//! declaration. Every replacement is recorded as a [`RouteOverride`].

use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{KernelError, Result};

/// HTTP method of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!("unsupported HTTP method '{}'", other)),
        }
    }
}

/// Page routes get client bundles; api routes do not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    #[default]
    Page,
    Api,
}

/// Identity of a route in the table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteKey {
    pub method: HttpMethod,
    pub pattern: String,
}

impl RouteKey {
    pub fn new(method: HttpMethod, pattern: impl Into<String>) -> Self {
        Self {
            method,
            pattern: pattern.into(),
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// Where a route (or component) renders within the page layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSlot {
    pub area_id: String,
    pub sort_order: i32,
}

/// A page component contributing to a route's bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub path: PathBuf,
    pub area_id: String,
    pub sort_order: i32,
}

/// One addressable page or API route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Stable route identity (bundle and manifest key)
    pub id: String,
    pub key: RouteKey,
    pub kind: RouteKind,
    /// Owning module
    pub module: String,
    /// Ordered middleware/handler chain
    pub handlers: Vec<String>,
    pub components: Vec<ComponentRef>,
    pub layout: Option<LayoutSlot>,
    /// Files the route was assembled from (declaration first)
    pub sources: Vec<PathBuf>,
    /// Set by the Build Gate
    pub build_required: bool,
}

impl RouteEntry {
    pub fn new(
        id: impl Into<String>,
        method: HttpMethod,
        pattern: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            key: RouteKey::new(method, pattern),
            kind: RouteKind::Page,
            module: module.into(),
            handlers: Vec::new(),
            components: Vec::new(),
            layout: None,
            sources: Vec::new(),
            build_required: false,
        }
    }

    pub fn with_kind(mut self, kind: RouteKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_handlers<I, S>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handlers = handlers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_component(mut self, component: ComponentRef) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    pub fn is_page(&self) -> bool {
        self.kind == RouteKind::Page
    }

    /// Components in composition order: area, then sort order, then
    /// declaration order
    pub fn ordered_components(&self) -> Vec<&ComponentRef> {
        let mut ordered: Vec<&ComponentRef> = self.components.iter().collect();
        ordered.sort_by(|a, b| {
            a.area_id
                .cmp(&b.area_id)
                .then(a.sort_order.cmp(&b.sort_order))
        });
        ordered
    }

    /// Check the declaration is usable
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoute` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| KernelError::InvalidRoute {
            module: self.module.clone(),
            route: self.id.clone(),
            reason,
        };
        if self.id.trim().is_empty() {
            return Err(invalid("route id must not be empty".into()));
        }
        if !self
            .id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid(format!(
                "route id '{}' may only contain ASCII letters, digits, '-' and '_'",
                self.id
            )));
        }
        if self
            .key
            .pattern
            .chars()
            .any(|c| c.is_control() || c == '\u{2028}' || c == '\u{2029}')
        {
            return Err(invalid(format!(
                "url pattern {:?} must not contain control or line separator characters",
                self.key.pattern
            )));
        }
        if !self.key.pattern.starts_with('/') {
            return Err(invalid(format!(
                "url pattern '{}' must start with '/'",
                self.key.pattern
            )));
        }
        match self.kind {
            RouteKind::Api if self.handlers.is_empty() => {
                Err(invalid("api routes need at least one handler".into()))
            }
            RouteKind::Api if !self.components.is_empty() => {
                Err(invalid("api routes cannot declare components".into()))
            }
            RouteKind::Page if self.handlers.is_empty() && self.components.is_empty() => Err(
                invalid("page routes need at least one handler or component".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Record of one route replacing another at the same key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOverride {
    pub key: RouteKey,
    pub previous_module: String,
    pub previous_id: String,
    pub module: String,
    pub id: String,
}

/// The global route table
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: IndexMap<RouteKey, RouteEntry>,
    overrides: Vec<RouteOverride>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route, replacing any entry at the same key
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRouteId` if another key already uses the route id.
    pub fn insert(&mut self, entry: RouteEntry) -> Result<Option<RouteOverride>> {
        if let Some(clash) = self
            .routes
            .values()
            .find(|r| r.id == entry.id && r.key != entry.key)
        {
            return Err(KernelError::DuplicateRouteId {
                route: entry.id.clone(),
                existing: format!("{} ({})", clash.key, clash.module),
                incoming: format!("{} ({})", entry.key, entry.module),
            });
        }

        let key = entry.key.clone();
        let (module, id) = (entry.module.clone(), entry.id.clone());
        let Some(previous) = self.routes.insert(key.clone(), entry) else {
            return Ok(None);
        };

        let record = RouteOverride {
            key,
            previous_module: previous.module,
            previous_id: previous.id,
            module,
            id,
        };
        tracing::warn!(
            component = module_path!(),
            route_key = %record.key,
            previous_module = %record.previous_module,
            module = %record.module,
            "route overridden"
        );
        self.overrides.push(record.clone());
        Ok(Some(record))
    }

    pub fn get(&self, key: &RouteKey) -> Option<&RouteEntry> {
        self.routes.get(key)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&RouteEntry> {
        self.routes.values().find(|r| r.id == id)
    }

    /// Routes in first-declaration order
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RouteEntry> {
        self.routes.values_mut()
    }

    pub fn page_routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.values().filter(|r| r.is_page())
    }

    /// Routes flagged by the Build Gate
    pub fn routes_requiring_build(&self) -> Vec<&RouteEntry> {
        self.routes.values().filter(|r| r.build_required).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every override recorded while loading, in order
    pub fn overrides(&self) -> &[RouteOverride] {
        &self.overrides
    }
}
