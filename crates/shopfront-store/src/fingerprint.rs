//! Filesystem source stamps

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::UNIX_EPOCH;

use shopfront_core::build::{sha256_hex, Fingerprinter, SourceStamp};
use shopfront_core::SfError;

use crate::errors::io_error;

/// Stamps files by size, modification time and content hash
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFingerprinter;

impl Fingerprinter for FsFingerprinter {
    fn stamp(&self, path: &Path) -> Result<SourceStamp, SfError> {
        let display = path.display().to_string();
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(SourceStamp::Missing { path: display })
            }
            Err(e) => return Err(io_error("stamp_source", path, e)),
        };
        let content = fs::read(path).map_err(|e| io_error("stamp_source", path, e))?;
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_millis() as u64);

        Ok(SourceStamp::Present {
            path: display,
            size: metadata.len(),
            mtime_ms,
            sha256: sha256_hex(&content),
        })
    }
}
