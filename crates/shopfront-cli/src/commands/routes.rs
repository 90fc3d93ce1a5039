//! `shopfront routes`

use std::path::Path;

use clap::Args;
use serde_json::json;
use shopfront_core::RouteKind;
use shopfront_core_types::RunId;
use shopfront_engine::load_routes;
use shopfront_store::load_app_config;

#[derive(Debug, Args)]
pub struct RoutesArgs {
    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(config: &Path, args: RoutesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app_config(config)?;
    let table = load_routes(&app.modules, &RunId::new())?;

    if args.json {
        let routes: Vec<_> = table
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "key": r.key.to_string(),
                    "kind": r.kind,
                    "module": r.module,
                    "handlers": r.handlers,
                })
            })
            .collect();
        let overrides: Vec<_> = table
            .overrides()
            .iter()
            .map(|o| {
                json!({
                    "key": o.key.to_string(),
                    "previous_module": o.previous_module,
                    "module": o.module,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "routes": routes, "overrides": overrides }))?
        );
        return Ok(());
    }

    for route in table.iter() {
        println!(
            "{:<32} {:<20} {:<5} {}",
            route.key.to_string(),
            route.id,
            match route.kind {
                RouteKind::Page => "page",
                RouteKind::Api => "api",
            },
            route.module
        );
    }
    for o in table.overrides() {
        println!("override {}: {} -> {}", o.key, o.previous_module, o.module);
    }

    Ok(())
}
