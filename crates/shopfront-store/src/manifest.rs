//! Build manifest persistence

use std::fs;
use std::io::ErrorKind;

use shopfront_core::build::BuildManifest;
use shopfront_core::{SfError, SfErrorKind};

use crate::atomic::atomic_write;
use crate::build_dir::BuildDir;
use crate::errors::{io_error, manifest_error, Result};

/// Read the manifest of `build_dir`; a missing file is an empty manifest
///
/// # Errors
///
/// Returns `InvalidManifest` if the file does not parse, has an unsupported
/// schema version or fails its digest check.
pub fn load_manifest(build_dir: &BuildDir) -> Result<BuildManifest> {
    let path = build_dir.manifest_path();
    let bytes = match fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BuildManifest::new()),
        Err(e) => return Err(io_error("load_manifest", &path, e)),
    };
    let manifest: BuildManifest =
        serde_json::from_slice(&bytes).map_err(|e| manifest_error(&path, e.to_string()))?;
    manifest
        .verify()
        .map_err(|e| SfError::from(e).with_path(path.display().to_string()))?;
    tracing::debug!(
        component = module_path!(),
        path = %path.display(),
        entries = manifest.len(),
        "manifest loaded"
    );
    Ok(manifest)
}

/// Seal and atomically write `manifest` into `build_dir`
///
/// # Errors
///
/// Returns `Serialization` or `Io` on failure; the previous file is intact.
pub fn save_manifest(build_dir: &BuildDir, manifest: &mut BuildManifest) -> Result<()> {
    manifest.seal().map_err(SfError::from)?;
    let mut json = serde_json::to_vec_pretty(manifest).map_err(|e| {
        SfError::new(SfErrorKind::Serialization)
            .with_op("save_manifest")
            .with_message(e.to_string())
    })?;
    json.push(b'\n');
    atomic_write(&build_dir.manifest_path(), &json)?;
    tracing::debug!(
        component = module_path!(),
        entries = manifest.len(),
        digest = manifest.entries_digest.as_deref().unwrap_or_default(),
        "manifest saved"
    );
    Ok(())
}
