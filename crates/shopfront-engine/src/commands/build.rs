//! Build Orchestrator.
//!
//! A build runs on a started [`Kernel`], so routes have been loaded, every
//! bootstrap has run, the kernel is locked and settings are valid before the
//! gate is consulted. One build invocation:
//!
//! 1. load the previous manifest (or wipe everything when forced)
//! 2. run the build gate over the route table
//! 3. clear `entries/`, the bundles being rebuilt, and bundles of vanished routes
//! 4. write an entry module per route to rebuild, plus the compile request
//! 5. hand the request to the compile collaborator
//! 6. on success only, mark the bundles complete, record fingerprints and
//!    persist the manifest
//!
//! A failed compile leaves the previous manifest untouched and no bundle
//! marked complete, so the next run rebuilds the same routes.

use std::time::Duration;

use serde::Serialize;
use shopfront_core::build::{render_entry_module, stale_routes, BundleEntry, GateReport};
use shopfront_core::{log_op_end, log_op_error, log_op_start};
use shopfront_core::{
    BuildDecision, BuildGate, BuildManifest, CompileRequest, CompileTarget, Compiler, RouteTable,
    SfError, SfErrorKind,
};
use shopfront_core_types::RunId;
use shopfront_store::errors::Result;
use shopfront_store::{load_manifest, save_manifest, BuildDir, FsFingerprinter};

use super::elapsed_ms;
use super::startup::Kernel;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Wipe the build directory and rebuild every page route
    pub force: bool,
    /// Upper bound for the compile step
    pub phase_timeout: Option<Duration>,
}

/// What one build did
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub run_id: String,
    pub gate: GateReport,
    /// Routes handed to the compiler
    pub built: Vec<String>,
    pub up_to_date: Vec<String>,
    pub not_applicable: Vec<String>,
    /// Manifest entries dropped because their route is gone
    pub removed: Vec<String>,
    pub manifest_digest: String,
}

/// Build client bundles for the page routes that need one
///
/// Sets `build_required` on every route of `kernel`.
///
/// # Errors
///
/// - `InvalidManifest`: the previous manifest is corrupt (rerun with force)
/// - `Io`: the build directory cannot be prepared or written
/// - `CompileFailed` / `Timeout`: the compile step failed; manifest untouched
pub async fn build(
    kernel: &mut Kernel,
    build_dir: &BuildDir,
    compiler: &dyn Compiler,
    options: &BuildOptions,
) -> Result<BuildReport> {
    let run_id = &kernel.run_id;
    let routes = &mut kernel.routes;
    log_op_start!(
        "build",
        run_id = %run_id,
        route_count = routes.len(),
        force = options.force
    );
    let start = std::time::Instant::now();

    let report = build_impl(routes, build_dir, compiler, options, run_id)
        .await
        .map_err(|e| {
            log_op_error!(
                "build",
                e.clone(),
                duration_ms = elapsed_ms(start),
                run_id = %run_id
            );
            e
        })?;

    log_op_end!(
        "build",
        duration_ms = elapsed_ms(start),
        run_id = %run_id,
        build_count = report.built.len(),
        up_to_date = report.up_to_date.len(),
        removed = report.removed.len()
    );
    Ok(report)
}

async fn build_impl(
    routes: &mut RouteTable,
    build_dir: &BuildDir,
    compiler: &dyn Compiler,
    options: &BuildOptions,
    run_id: &RunId,
) -> Result<BuildReport> {
    let mut manifest = if options.force {
        build_dir.wipe()?;
        BuildManifest::new()
    } else {
        load_manifest(build_dir)?
    };

    let gate = BuildGate::new(&FsFingerprinter, build_dir)
        .force(options.force)
        .evaluate(routes, &manifest)?;
    let stale = stale_routes(routes, &manifest);
    let rebuild: Vec<String> = gate.required().map(|d| d.route_id.clone()).collect();

    build_dir.prepare(rebuild.as_slice(), stale.as_slice())?;

    let mut targets = Vec::with_capacity(rebuild.len());
    for route in routes.routes_requiring_build() {
        let source = render_entry_module(&BundleEntry::from_route(route));
        let entry = build_dir.write_entry(&route.id, &source)?;
        targets.push(CompileTarget {
            route_id: route.id.clone(),
            route_key: route.key.to_string(),
            entry,
            output_dir: build_dir.bundle_dir(&route.id),
        });
    }

    if !targets.is_empty() {
        let request = CompileRequest {
            run_id: run_id.to_string(),
            build_dir: build_dir.root().to_path_buf(),
            targets,
        };
        build_dir.write_compile_request(&request)?;
        compile(compiler, &request, options.phase_timeout).await?;
        for target in &request.targets {
            build_dir.mark_complete(&target.route_id)?;
        }
    }

    for decision in gate.required() {
        if let Some(fingerprint) = &decision.fingerprint {
            manifest.record(
                decision.route_id.clone(),
                fingerprint.clone(),
                decision.route_key.clone(),
            );
        }
    }
    let removed = manifest.retain_routes(|id| routes.get_by_id(id).is_some_and(|r| r.is_page()));
    save_manifest(build_dir, &mut manifest)?;
    let manifest_digest = manifest.digest().map_err(SfError::from)?;

    let ids_with = |wanted: BuildDecision| -> Vec<String> {
        gate.decisions
            .iter()
            .filter(|d| d.decision == wanted)
            .map(|d| d.route_id.clone())
            .collect()
    };
    let up_to_date = ids_with(BuildDecision::UpToDate);
    let not_applicable = ids_with(BuildDecision::NotApplicable);

    Ok(BuildReport {
        run_id: run_id.to_string(),
        gate,
        built: rebuild,
        up_to_date,
        not_applicable,
        removed,
        manifest_digest,
    })
}

async fn compile(
    compiler: &dyn Compiler,
    request: &CompileRequest,
    phase_timeout: Option<Duration>,
) -> Result<()> {
    tracing::info!(
        component = module_path!(),
        run_id = %request.run_id,
        build_count = request.targets.len(),
        "compiling"
    );
    match phase_timeout {
        Some(limit) => tokio::time::timeout(limit, compiler.compile(request))
            .await
            .map_err(|_| {
                SfError::new(SfErrorKind::Timeout)
                    .with_op("compile")
                    .with_message(format!("compile exceeded {}ms", limit.as_millis()))
            })?,
        None => compiler.compile(request).await,
    }
}
