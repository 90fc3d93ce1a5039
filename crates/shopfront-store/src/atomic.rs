//! Atomic file writes
//!
//! Content is written to a sibling temp file and renamed over the target, so
//! readers see either the old file or the new one, never a partial write.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{io_error, Result};

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Atomically write `content` to `target`, creating parent directories
pub fn atomic_write(target: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create_dir", parent, e))?;
    }
    let temp = temp_path(target);
    fs::write(&temp, content).map_err(|e| io_error("write_temp", &temp, e))?;
    fs::rename(&temp, target).map_err(|e| io_error("rename_temp", target, e))?;
    Ok(())
}
