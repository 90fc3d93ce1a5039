//! Build-side kernel: fingerprints, manifest, gate and bundle entries.
//!
//! Everything here is pure. Filesystem access (stamping sources, probing
//! bundle output, persisting the manifest) is injected through
//! [`Fingerprinter`] and [`OutputProbe`] so decisions can be tested without
//! touching disk.

pub mod entry;
pub mod fingerprint;
pub mod gate;
pub mod manifest;

pub use entry::{render_entry_module, BundleEntry};
pub use fingerprint::{fingerprint_route, source_files, Fingerprinter, RouteFingerprint, SourceStamp};
pub use gate::{requires_build, stale_routes, BuildDecision, BuildGate, GateReport, OutputProbe, RouteDecision};
pub use manifest::{BuildManifest, ManifestEntry, MANIFEST_SCHEMA_VERSION};

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
