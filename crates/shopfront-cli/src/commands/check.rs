//! `shopfront check`

use std::path::Path;

use clap::Args;
use shopfront_core::BootstrapCatalog;
use shopfront_engine::{start, StartupOptions};
use shopfront_store::load_app_config;

use super::phase_timeout;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Per-module bootstrap timeout in milliseconds (0 = none)
    #[arg(long, default_value_t = 0)]
    pub timeout_ms: u64,
}

pub async fn execute(config: &Path, args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app_config(config)?;
    let options = StartupOptions {
        phase_timeout: phase_timeout(args.timeout_ms),
    };

    // Only declarative contributions (route files, schema files) exist in a
    // stock binary; compiled-in bootstraps are linked by embedding crates.
    let kernel = start(&app, &BootstrapCatalog::new(), &options).await?;

    println!("run: {}", kernel.run_id);
    println!("modules: {}", kernel.modules.names().join(", "));
    println!(
        "routes: {} ({} overridden)",
        kernel.routes.len(),
        kernel.routes.overrides().len()
    );
    for point in kernel.registry.extension_points() {
        let final_marker = if kernel.registry.has_final_processor(&point) {
            " + final"
        } else {
            ""
        };
        println!(
            "extension point {}: {} processors{}",
            point,
            kernel.registry.processor_count(&point),
            final_marker
        );
    }
    for function in kernel.hooks.hooked_functions() {
        println!("hooked {}: {} hooks", function, kernel.hooks.hook_count(&function));
    }
    println!("settings: valid");

    Ok(())
}
