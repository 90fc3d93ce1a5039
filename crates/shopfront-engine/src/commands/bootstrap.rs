//! Bootstrap Loader.
//!
//! Runs each module's contribution in load order against one mutable
//! [`BootstrapState`]. For every module the declarative schema file (if any)
//! is merged first, then the compiled-in bootstrap from the catalog runs.
//! The first failure aborts the phase.

use std::time::Duration;

use serde_json::Value;
use shopfront_core::{log_op_end, log_op_error, log_op_start};
use shopfront_core::{
    BootstrapCatalog, BootstrapContext, ConfigSchema, HookTable, KernelError, LockController,
    ModuleDescriptor, ModuleSet, Registry, SfError, SfErrorKind,
};
use shopfront_core_types::RunId;
use shopfront_store::errors::Result;
use shopfront_store::load_schema_contribution;

use super::elapsed_ms;

/// Kernel state that bootstraps mutate, all bound to one lock
#[derive(Debug)]
pub struct BootstrapState {
    pub lock: LockController,
    pub registry: Registry,
    pub hooks: HookTable,
    pub schema: ConfigSchema,
    /// Raw runtime settings handed to every bootstrap
    pub settings: Value,
}

impl BootstrapState {
    pub fn new(settings: Value) -> Self {
        let lock = LockController::new();
        Self {
            registry: Registry::new(lock.clone()),
            hooks: HookTable::new(lock.clone()),
            lock,
            schema: ConfigSchema::new(),
            settings,
        }
    }
}

/// Run every module's bootstrap in load order
///
/// A bootstrap sees exactly the contributions of the modules before it plus
/// its own so far. Modules without a catalog entry contribute only their
/// schema file.
///
/// # Errors
///
/// - `InvalidSchema`: a schema file is malformed or breaks the merged schema
/// - `BootstrapFailed`: a bootstrap returned an error (the cause is kept as
///   the error source)
/// - `Timeout`: a bootstrap outlived `phase_timeout`
pub async fn run_bootstraps(
    modules: &ModuleSet,
    catalog: &BootstrapCatalog,
    state: &mut BootstrapState,
    phase_timeout: Option<Duration>,
    run_id: &RunId,
) -> Result<()> {
    log_op_start!("run_bootstraps", run_id = %run_id, module_count = modules.len());
    let start = std::time::Instant::now();

    for module in modules.iter() {
        if let Err(e) = bootstrap_module(module, catalog, state, phase_timeout).await {
            log_op_error!(
                "run_bootstraps",
                e.clone(),
                duration_ms = elapsed_ms(start),
                run_id = %run_id,
                module = %module.name
            );
            return Err(e);
        }
    }

    log_op_end!(
        "run_bootstraps",
        duration_ms = elapsed_ms(start),
        run_id = %run_id,
        extension_points = state.registry.extension_points().len(),
        hooked_functions = state.hooks.hooked_functions().len()
    );
    Ok(())
}

async fn bootstrap_module(
    module: &ModuleDescriptor,
    catalog: &BootstrapCatalog,
    state: &mut BootstrapState,
    phase_timeout: Option<Duration>,
) -> Result<()> {
    if let Some(partial) = load_schema_contribution(module)? {
        state.schema.merge(partial).map_err(|e| {
            SfError::from(e)
                .with_op("merge_config_schema")
                .with_module(module.name.clone())
        })?;
    }

    let Some(bootstrap) = catalog.get(&module.name) else {
        tracing::debug!(
            component = module_path!(),
            module = %module.name,
            "no compiled bootstrap"
        );
        return Ok(());
    };

    let mut ctx = BootstrapContext::new(
        module,
        &mut state.registry,
        &mut state.hooks,
        &mut state.schema,
        &state.settings,
    );
    let outcome = match phase_timeout {
        Some(limit) => tokio::time::timeout(limit, bootstrap.bootstrap(&mut ctx))
            .await
            .map_err(|_| {
                SfError::new(SfErrorKind::Timeout)
                    .with_op("bootstrap")
                    .with_module(module.name.clone())
                    .with_message(format!("bootstrap exceeded {}ms", limit.as_millis()))
            })?,
        None => bootstrap.bootstrap(&mut ctx).await,
    };

    outcome.map_err(|cause| {
        SfError::from(KernelError::BootstrapFailed {
            module: module.name.clone(),
            reason: cause.to_string(),
        })
        .with_source(SfError::from(cause))
    })?;

    tracing::debug!(
        component = module_path!(),
        module = %module.name,
        "module bootstrapped"
    );
    Ok(())
}
