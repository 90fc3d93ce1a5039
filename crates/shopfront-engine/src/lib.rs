//! Shopfront Engine - Orchestration layer
//!
//! Coordinates the pure kernel (`shopfront-core`) with the filesystem layer
//! (`shopfront-store`):
//! - Route Loader: discover, parse and merge route declarations
//! - Bootstrap Loader: run module bootstraps in load order
//! - Startup pipeline: load, bootstrap, lock, validate settings
//! - Build Orchestrator: gate, generate entries, compile, persist manifest

pub mod commands;

pub use commands::bootstrap::{run_bootstraps, BootstrapState};
pub use commands::build::{build, BuildOptions, BuildReport};
pub use commands::compiler::CommandCompiler;
pub use commands::routes::load_routes;
pub use commands::startup::{start, Kernel, StartupOptions};
