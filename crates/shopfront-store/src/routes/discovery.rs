use std::io;
use std::path::{Path, PathBuf};

use shopfront_core::{ModuleDescriptor, SfError};
use walkdir::WalkDir;

use crate::errors::{io_error, Result};

pub const ROUTES_DIR: &str = "routes";
pub const ROUTE_FILE_NAMES: [&str; 3] = ["route.yaml", "route.yml", "route.json"];

/// Route declaration files of `module`, sorted by path
///
/// A module without a `routes/` directory declares no routes. Symlinks are
/// not followed.
///
/// # Errors
///
/// Returns `Io` if a directory under `routes/` cannot be listed.
pub fn discover_route_files(module: &ModuleDescriptor) -> Result<Vec<PathBuf>> {
    let root = module.root.join(ROUTES_DIR);
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(&root, e))?;
        let is_route_file = entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|n| ROUTE_FILE_NAMES.contains(&n));
        if is_route_file {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn walk_error(root: &Path, err: walkdir::Error) -> SfError {
    let path = err.path().unwrap_or(root).to_path_buf();
    io_error("discover_routes", &path, io::Error::from(err))
}
