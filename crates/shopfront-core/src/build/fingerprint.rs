//! Route fingerprints.
//!
//! A fingerprint is the SHA-256 of a canonical JSON document describing the
//! route: its identity, handler chain, ordered components and one stamp per
//! source file. Equal inputs always give equal fingerprints; changing any
//! single stamp changes the fingerprint.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::sha256_hex;
use crate::errors::{Result, SfError};
use crate::route::RouteEntry;

/// Observed state of one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SourceStamp {
    Present {
        path: String,
        size: u64,
        mtime_ms: u64,
        sha256: String,
    },
    Missing {
        path: String,
    },
}

impl SourceStamp {
    pub fn path(&self) -> &str {
        match self {
            SourceStamp::Present { path, .. } | SourceStamp::Missing { path } => path,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, SourceStamp::Missing { .. })
    }
}

/// Stamps source files; the filesystem implementation lives in the store
pub trait Fingerprinter {
    /// Stamp `path`. A missing file is a `Missing` stamp, not an error.
    fn stamp(&self, path: &Path) -> std::result::Result<SourceStamp, SfError>;
}

/// Hex-encoded route fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteFingerprint(String);

impl RouteFingerprint {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct CanonicalComponent<'a> {
    path: String,
    area_id: &'a str,
    sort_order: i32,
}

#[derive(Serialize)]
struct CanonicalRoute<'a> {
    id: &'a str,
    method: &'a str,
    pattern: &'a str,
    handlers: &'a [String],
    components: Vec<CanonicalComponent<'a>>,
    sources: &'a [SourceStamp],
}

/// Files that feed a route's bundle: declaration files, then component files
///
/// Duplicates are dropped, first occurrence wins.
pub fn source_files(route: &RouteEntry) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    let candidates = route
        .sources
        .iter()
        .cloned()
        .chain(route.ordered_components().into_iter().map(|c| c.path.clone()));
    for path in candidates {
        if !files.contains(&path) {
            files.push(path);
        }
    }
    files
}

/// Fingerprint `route` given stamps for its [`source_files`]
///
/// # Errors
///
/// Returns `Serialization` if the canonical document cannot be encoded.
pub fn fingerprint_route(route: &RouteEntry, stamps: &[SourceStamp]) -> Result<RouteFingerprint> {
    let canonical = CanonicalRoute {
        id: &route.id,
        method: route.key.method.as_str(),
        pattern: &route.key.pattern,
        handlers: &route.handlers,
        components: route
            .ordered_components()
            .into_iter()
            .map(|c| CanonicalComponent {
                path: c.path.to_string_lossy().into_owned(),
                area_id: &c.area_id,
                sort_order: c.sort_order,
            })
            .collect(),
        sources: stamps,
    };
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(RouteFingerprint(sha256_hex(&bytes)))
}
