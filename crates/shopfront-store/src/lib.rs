//! Shopfront Store - filesystem layer
//!
//! Provides:
//! - Application config loading (`shopfront.yaml`)
//! - Route declaration discovery and parsing
//! - Declarative config schema contributions
//! - Source fingerprinting for the build gate
//! - Build directory lifecycle and manifest persistence (atomic writes)

pub mod atomic;
pub mod build_dir;
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod manifest;
pub mod routes;
pub mod schema;

// Re-export key types
pub use build_dir::BuildDir;
pub use config::{load_app_config, AppConfig};
pub use errors::Result;
pub use fingerprint::FsFingerprinter;
pub use manifest::{load_manifest, save_manifest};
pub use routes::{discover_route_files, parse_route_file};
pub use schema::load_schema_contribution;
