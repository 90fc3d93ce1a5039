//! Startup pipeline.
//!
//! `load routes -> run bootstraps -> lock -> apply defaults and validate`.
//! Any failure is fatal; the caller gets no kernel. Once [`start`] returns,
//! the registry and hook table are frozen and can be shared across tasks.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use shopfront_core::{log_op_end, log_op_error, log_op_start};
use shopfront_core::{
    BootstrapCatalog, Callable, ComposedFunction, ConfigSchema, HookTable, KernelError,
    LockController, ModuleSet, Registry, RouteTable, SfError,
};
use shopfront_core_types::RunId;
use shopfront_store::errors::Result;
use shopfront_store::AppConfig;

use super::bootstrap::{run_bootstraps, BootstrapState};
use super::elapsed_ms;
use super::routes::load_routes;

#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Upper bound for each module's bootstrap
    pub phase_timeout: Option<Duration>,
}

/// A started, locked kernel
#[derive(Debug, Clone)]
pub struct Kernel {
    pub run_id: RunId,
    pub modules: ModuleSet,
    pub routes: RouteTable,
    pub registry: Arc<Registry>,
    pub hooks: Arc<HookTable>,
    pub schema: ConfigSchema,
    /// Runtime settings with schema defaults applied
    pub settings: Value,
    pub lock: LockController,
}

impl Kernel {
    /// Fold `extension_point` over `initial`
    ///
    /// # Errors
    ///
    /// Propagates processor failures.
    pub async fn run_processors(&self, extension_point: &str, initial: Value) -> Result<Value> {
        self.registry
            .run_processors(extension_point, initial)
            .await
            .map_err(SfError::from)
    }

    /// `original` wrapped in every hook registered for `function_name`
    pub fn composed(&self, function_name: &str, original: Callable) -> ComposedFunction {
        self.hooks.get_composed_function(function_name, original)
    }
}

/// Start the kernel described by `config`
///
/// # Errors
///
/// - Route loading errors (`InvalidRoute`, `DuplicateRouteId`, `Io`)
/// - Bootstrap errors (`InvalidSchema`, `BootstrapFailed`, `Timeout`)
/// - `InvalidConfig`: settings violate the merged schema
pub async fn start(
    config: &AppConfig,
    catalog: &BootstrapCatalog,
    options: &StartupOptions,
) -> Result<Kernel> {
    let run_id = RunId::new();
    log_op_start!("startup", run_id = %run_id, module_count = config.modules.len());
    let start = std::time::Instant::now();

    let kernel = start_impl(config, catalog, options, run_id.clone())
        .await
        .map_err(|e| {
            log_op_error!(
                "startup",
                e.clone(),
                duration_ms = elapsed_ms(start),
                run_id = %run_id
            );
            e
        })?;

    log_op_end!(
        "startup",
        duration_ms = elapsed_ms(start),
        run_id = %run_id,
        route_count = kernel.routes.len()
    );
    Ok(kernel)
}

async fn start_impl(
    config: &AppConfig,
    catalog: &BootstrapCatalog,
    options: &StartupOptions,
    run_id: RunId,
) -> Result<Kernel> {
    let routes = load_routes(&config.modules, &run_id)?;

    let mut state = BootstrapState::new(config.settings.clone());
    run_bootstraps(
        &config.modules,
        catalog,
        &mut state,
        options.phase_timeout,
        &run_id,
    )
    .await?;

    state.lock.lock();
    tracing::info!(
        component = module_path!(),
        run_id = %run_id,
        "kernel locked"
    );

    let BootstrapState {
        lock,
        registry,
        hooks,
        schema,
        mut settings,
    } = state;

    schema.apply_defaults(&mut settings);
    let violations = schema.validate(&settings);
    if !violations.is_empty() {
        return Err(KernelError::InvalidConfig {
            violations: violations.iter().map(ToString::to_string).collect(),
        }
        .into());
    }

    Ok(Kernel {
        run_id,
        modules: config.modules.clone(),
        routes,
        registry: Arc::new(registry),
        hooks: Arc::new(hooks),
        schema,
        settings,
        lock,
    })
}
