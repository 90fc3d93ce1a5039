//! `shopfront build`

use std::path::{Path, PathBuf};

use clap::Args;
use shopfront_core::{BootstrapCatalog, Compiler, NoopCompiler};
use shopfront_engine::{build, start, BuildOptions, CommandCompiler, StartupOptions};
use shopfront_store::{load_app_config, BuildDir};

use super::phase_timeout;

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Build output directory (overrides `build.output_dir`)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Wipe the build directory and rebuild every page route
    #[arg(long)]
    pub force: bool,

    /// Compiler command line; receives SHOPFRONT_COMPILE_REQUEST
    #[arg(long)]
    pub compiler: Option<String>,

    /// Per-bootstrap and compile timeout in milliseconds (0 = none)
    #[arg(long, default_value_t = 0)]
    pub timeout_ms: u64,

    /// Print the build report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(config: &Path, args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app_config(config)?;
    let build_dir = BuildDir::new(args.build_dir.unwrap_or_else(|| app.build_dir.clone()));

    let compiler: Box<dyn Compiler> = match args.compiler.as_deref() {
        Some(line) => Box::new(
            CommandCompiler::from_command_line(line).ok_or("--compiler must not be blank")?,
        ),
        None => {
            tracing::warn!(
                component = module_path!(),
                "no compiler configured; generating entries only"
            );
            Box::new(NoopCompiler)
        }
    };

    let timeout = phase_timeout(args.timeout_ms);
    let mut kernel = start(
        &app,
        &BootstrapCatalog::new(),
        &StartupOptions {
            phase_timeout: timeout,
        },
    )
    .await?;
    let options = BuildOptions {
        force: args.force,
        phase_timeout: timeout,
    };
    let report = build(&mut kernel, &build_dir, compiler.as_ref(), &options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("run: {}", report.run_id);
    for decision in &report.gate.decisions {
        println!("{:<20} {}", decision.route_id, decision.decision);
    }
    println!(
        "built {}, up to date {}, removed {}",
        report.built.len(),
        report.up_to_date.len(),
        report.removed.len()
    );
    println!("manifest: {}", report.manifest_digest);

    Ok(())
}
