//! Build output directory layout and lifecycle
//!
//! ```text
//! <build_dir>/
//!   manifest.json
//!   compile-request.json
//!   entries/<route_id>.js
//!   bundles/<route_id>/
//!   bundles/<route_id>/.complete
//! ```
//!
//! A bundle directory counts as output only once its `.complete` marker has
//! been written, which happens after the compiler succeeded.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use shopfront_core::build::OutputProbe;
use shopfront_core::{CompileRequest, SfError, SfErrorKind};

use crate::atomic::atomic_write;
use crate::errors::{io_error, Result};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const COMPILE_REQUEST_FILE: &str = "compile-request.json";
pub const ENTRIES_DIR: &str = "entries";
pub const BUNDLES_DIR: &str = "bundles";
pub const BUNDLE_COMPLETE_FILE: &str = ".complete";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDir {
    root: PathBuf,
}

fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error("clear_build_dir", path, e)),
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| io_error("create_build_dir", path, e))
}

impl BuildDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn compile_request_path(&self) -> PathBuf {
        self.root.join(COMPILE_REQUEST_FILE)
    }

    pub fn entries_dir(&self) -> PathBuf {
        self.root.join(ENTRIES_DIR)
    }

    pub fn entry_path(&self, route_id: &str) -> PathBuf {
        self.entries_dir().join(format!("{}.js", route_id))
    }

    pub fn bundle_dir(&self, route_id: &str) -> PathBuf {
        self.root.join(BUNDLES_DIR).join(route_id)
    }

    /// Remove the whole build directory
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory exists but cannot be removed.
    pub fn wipe(&self) -> Result<()> {
        tracing::debug!(component = module_path!(), root = %self.root.display(), "wiping build dir");
        remove_dir_if_exists(&self.root)
    }

    /// Clear and recreate the output of the routes about to be compiled
    ///
    /// `entries/` is recreated empty. Every route in `rebuild` gets a fresh,
    /// empty bundle directory without a completion marker. Bundle directories of `stale` routes are
    /// removed. Bundles of up-to-date routes are left alone.
    ///
    /// # Errors
    ///
    /// Returns `Io` on any filesystem failure.
    pub fn prepare<S: AsRef<str>>(&self, rebuild: &[S], stale: &[S]) -> Result<()> {
        create_dir(&self.root)?;
        let entries = self.entries_dir();
        remove_dir_if_exists(&entries)?;
        create_dir(&entries)?;

        for id in rebuild {
            let dir = self.bundle_dir(id.as_ref());
            remove_dir_if_exists(&dir)?;
            create_dir(&dir)?;
        }
        for id in stale {
            remove_dir_if_exists(&self.bundle_dir(id.as_ref()))?;
        }
        tracing::debug!(
            component = module_path!(),
            rebuild = rebuild.len(),
            stale = stale.len(),
            "build dir prepared"
        );
        Ok(())
    }

    /// Write a route's generated entry module
    pub fn write_entry(&self, route_id: &str, source: &str) -> Result<PathBuf> {
        let path = self.entry_path(route_id);
        atomic_write(&path, source.as_bytes())?;
        Ok(path)
    }

    /// Persist the compile request handed to external compilers
    pub fn write_compile_request(&self, request: &CompileRequest) -> Result<PathBuf> {
        let path = self.compile_request_path();
        let json = serde_json::to_vec_pretty(request).map_err(|e| {
            SfError::new(SfErrorKind::Serialization)
                .with_op("write_compile_request")
                .with_message(e.to_string())
        })?;
        atomic_write(&path, &json)?;
        Ok(path)
    }

    /// Record that the compiler finished `route_id`'s bundle
    ///
    /// # Errors
    ///
    /// Returns `Io` if the marker cannot be written.
    pub fn mark_complete(&self, route_id: &str) -> Result<()> {
        let dir = self.bundle_dir(route_id);
        create_dir(&dir)?;
        atomic_write(&dir.join(BUNDLE_COMPLETE_FILE), b"")
    }

    pub fn has_output(&self, route_id: &str) -> bool {
        self.bundle_dir(route_id).join(BUNDLE_COMPLETE_FILE).is_file()
    }
}

impl OutputProbe for BuildDir {
    fn has_output(&self, route_id: &str) -> bool {
        BuildDir::has_output(self, route_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let dir = BuildDir::new("/b");
        assert_eq!(dir.manifest_path(), PathBuf::from("/b/manifest.json"));
        assert_eq!(dir.entry_path("home"), PathBuf::from("/b/entries/home.js"));
        assert_eq!(dir.bundle_dir("home"), PathBuf::from("/b/bundles/home"));
    }

    #[test]
    fn test_prepare_clears_only_affected_bundles() {
        let tmp = TempDir::new().unwrap();
        let dir = BuildDir::new(tmp.path().join("build"));
        dir.prepare(&["home", "cart", "old"], &[]).unwrap();
        for id in ["home", "cart", "old"] {
            fs::write(dir.bundle_dir(id).join("main.js"), id).unwrap();
        }
        dir.write_entry("home", "// entry").unwrap();

        for id in ["home", "cart", "old"] {
            dir.mark_complete(id).unwrap();
        }

        dir.prepare(&["home"], &["old"]).unwrap();

        assert!(dir.bundle_dir("home").is_dir());
        assert!(!dir.has_output("home"));
        assert!(!dir.bundle_dir("home").join("main.js").exists());
        assert!(dir.bundle_dir("cart").join("main.js").exists());
        assert!(dir.has_output("cart"));
        assert!(!dir.has_output("old"));
        assert!(!dir.entry_path("home").exists());
        assert!(dir.entries_dir().is_dir());
    }

    #[test]
    fn test_empty_bundle_dir_is_not_output() {
        let tmp = TempDir::new().unwrap();
        let dir = BuildDir::new(tmp.path().join("build"));
        dir.prepare(&["home"], &[]).unwrap();
        fs::write(dir.bundle_dir("home").join("partial.js"), "half").unwrap();
        assert!(!dir.has_output("home"));

        dir.mark_complete("home").unwrap();
        assert!(dir.has_output("home"));
    }

    #[test]
    fn test_wipe_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = BuildDir::new(tmp.path().join("build"));
        dir.wipe().unwrap();
        dir.prepare(&["home"], &[]).unwrap();
        dir.wipe().unwrap();
        assert!(!dir.root().exists());
    }
}
