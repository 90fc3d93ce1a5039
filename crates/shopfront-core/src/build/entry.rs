//! Bundler entry modules.
//!
//! Each page route that needs a build gets one generated JavaScript module
//! importing its components in composition order: by area, then sort order,
//! then declaration order.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;

use crate::route::{LayoutSlot, RouteEntry};

/// One import in an entry module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryImport {
    pub path: String,
    pub area_id: String,
    pub sort_order: i32,
}

/// Everything needed to render a route's entry module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleEntry {
    pub route_id: String,
    pub method: String,
    pub pattern: String,
    pub layout: Option<LayoutSlot>,
    pub imports: Vec<EntryImport>,
}

impl BundleEntry {
    pub fn from_route(route: &RouteEntry) -> Self {
        Self {
            route_id: route.id.clone(),
            method: route.key.method.as_str().to_string(),
            pattern: route.key.pattern.clone(),
            layout: route.layout.clone(),
            imports: route
                .ordered_components()
                .into_iter()
                .map(|c| EntryImport {
                    // Bundlers expect forward slashes
                    path: c.path.to_string_lossy().replace('\\', "/"),
                    area_id: c.area_id.clone(),
                    sort_order: c.sort_order,
                })
                .collect(),
        }
    }
}

fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Render the JavaScript source of `entry`
pub fn render_entry_module(entry: &BundleEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Generated by shopfront. Do not edit.");
    let _ = writeln!(
        out,
        "// Route: {} ({} {})",
        entry.route_id,
        entry.method,
        js_string(&entry.pattern)
    );
    for (i, import) in entry.imports.iter().enumerate() {
        let _ = writeln!(out, "import Component{} from {};", i, js_string(&import.path));
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "export const route = {{ id: {}, method: {}, pattern: {} }};",
        js_string(&entry.route_id),
        js_string(&entry.method),
        js_string(&entry.pattern)
    );
    match &entry.layout {
        Some(layout) => {
            let _ = writeln!(
                out,
                "export const layout = {{ areaId: {}, sortOrder: {} }};",
                js_string(&layout.area_id),
                layout.sort_order
            );
        }
        None => {
            let _ = writeln!(out, "export const layout = null;");
        }
    }

    let _ = writeln!(out, "export const components = [");
    for (i, import) in entry.imports.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {{ areaId: {}, sortOrder: {}, component: Component{} }},",
            js_string(&import.area_id),
            import.sort_order,
            i
        );
    }
    let _ = writeln!(out, "];");
    let _ = writeln!(out, "export default components;");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{ComponentRef, HttpMethod};

    fn component(path: &str, area: &str, order: i32) -> ComponentRef {
        ComponentRef {
            path: path.into(),
            area_id: area.into(),
            sort_order: order,
        }
    }

    #[test]
    fn test_imports_follow_composition_order() {
        let route = RouteEntry::new("productView", HttpMethod::Get, "/product/:id", "catalog")
            .with_component(component("/c/Price.jsx", "content", 20))
            .with_component(component("/c/Breadcrumb.jsx", "aside", 5))
            .with_component(component("/c/Title.jsx", "content", 10))
            .with_component(component("/c/Rating.jsx", "content", 20));

        let entry = BundleEntry::from_route(&route);
        let order: Vec<&str> = entry.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            order,
            vec!["/c/Breadcrumb.jsx", "/c/Title.jsx", "/c/Price.jsx", "/c/Rating.jsx"]
        );

        let js = render_entry_module(&entry);
        assert!(js.contains("import Component0 from \"/c/Breadcrumb.jsx\";"));
        assert!(js.contains("import Component3 from \"/c/Rating.jsx\";"));
        assert!(js.contains("{ areaId: \"content\", sortOrder: 10, component: Component1 }"));
        assert!(js.contains("export const layout = null;"));
    }

    #[test]
    fn test_strings_are_escaped() {
        let route = RouteEntry::new("odd", HttpMethod::Get, "/a\"b", "base")
            .with_component(component("/c/Quote\"d.jsx", "main", 0));
        let js = render_entry_module(&BundleEntry::from_route(&route));
        assert!(js.contains(r#"from "/c/Quote\"d.jsx";"#));
        assert!(js.contains(r#"pattern: "/a\"b""#));
    }

    #[test]
    fn test_header_comment_stays_on_one_line() {
        let route = RouteEntry::new("odd", HttpMethod::Get, "/a\nwindow.pwned = 1;", "base")
            .with_component(component("/c/A.jsx", "main", 0));
        let js = render_entry_module(&BundleEntry::from_route(&route));
        assert!(js.contains(r#"// Route: odd (GET "/a\nwindow.pwned = 1;")"#), "{js}");
        assert!(!js.lines().any(|l| l.starts_with("window.pwned")));
    }

    #[test]
    fn test_layout_rendered() {
        let mut route = RouteEntry::new("home", HttpMethod::Get, "/", "base");
        route.layout = Some(LayoutSlot {
            area_id: "content".into(),
            sort_order: 1,
        });
        let js = render_entry_module(&BundleEntry::from_route(&route));
        assert!(js.contains("export const layout = { areaId: \"content\", sortOrder: 1 };"));
    }
}
