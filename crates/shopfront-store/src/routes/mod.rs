//! Route declaration files
//!
//! Each module declares routes under `<root>/routes/`, one directory per
//! route holding a `route.yaml`, `route.yml` or `route.json`. Discovery is
//! sorted by path so the load order never depends on directory iteration.

mod discovery;
mod format;
mod parser;

pub use discovery::{discover_route_files, ROUTES_DIR, ROUTE_FILE_NAMES};
pub use format::{ComponentDeclaration, LayoutDeclaration, RouteDeclaration};
pub use parser::{parse_route_file, parse_route_str, RouteFileFormat};
