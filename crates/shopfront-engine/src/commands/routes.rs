//! Route Loader.
//!
//! Walks modules in load order, parses every route declaration and merges it
//! into one [`RouteTable`]. A later declaration at an existing
//! (method, pattern) key replaces the earlier one in place; each replacement
//! is logged as a warning naming both modules.

use shopfront_core::{log_op_end, log_op_error, log_op_start};
use shopfront_core::{ModuleSet, RouteTable, SfError};
use shopfront_core_types::RunId;
use shopfront_store::errors::Result;
use shopfront_store::{discover_route_files, parse_route_file};

use super::elapsed_ms;

/// Build the global route table from every module's declarations
///
/// Fails fast: the first unreadable or invalid declaration aborts loading.
///
/// # Errors
///
/// - `InvalidRoute`: malformed declaration (names module and file)
/// - `DuplicateRouteId`: two live routes share an id
/// - `Io`: a routes directory cannot be walked
pub fn load_routes(modules: &ModuleSet, run_id: &RunId) -> Result<RouteTable> {
    log_op_start!("load_routes", run_id = %run_id, module_count = modules.len());
    let start = std::time::Instant::now();

    let table = load_routes_impl(modules).map_err(|e| {
        log_op_error!(
            "load_routes",
            e.clone(),
            duration_ms = elapsed_ms(start),
            run_id = %run_id
        );
        e
    })?;

    log_op_end!(
        "load_routes",
        duration_ms = elapsed_ms(start),
        run_id = %run_id,
        route_count = table.len(),
        overrides = table.overrides().len()
    );
    Ok(table)
}

fn load_routes_impl(modules: &ModuleSet) -> Result<RouteTable> {
    let mut table = RouteTable::new();

    for module in modules.iter() {
        let files = discover_route_files(module)?;
        tracing::debug!(
            component = module_path!(),
            module = %module.name,
            files = files.len(),
            "discovered route files"
        );

        for file in files {
            let entry = parse_route_file(module, &file)?;
            table.insert(entry).map_err(|e| {
                SfError::from(e)
                    .with_op("load_routes")
                    .with_module(module.name.clone())
                    .with_path(file.display().to_string())
            })?;
        }
    }

    Ok(table)
}
