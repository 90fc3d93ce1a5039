//! Build manifest schema.
//!
//! The manifest maps route ids to the fingerprint they were last compiled
//! with. Entries live in a `BTreeMap`, so serialization is sorted by route id
//! and stable for diffing across runs.
//!
//! ## Schema Version
//!
//! Current manifest schema version: **1**

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fingerprint::RouteFingerprint;
use super::sha256_hex;
use crate::errors::{KernelError, Result};

pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Last successful build of one route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub fingerprint: RouteFingerprint,
    /// `METHOD /pattern`, for humans reading the file
    pub route_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub manifest_schema_version: u32,
    pub entries: BTreeMap<String, ManifestEntry>,
    /// Digest of `entries`, filled in by [`seal`](Self::seal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_digest: Option<String>,
}

impl Default for BuildManifest {
    fn default() -> Self {
        Self {
            manifest_schema_version: MANIFEST_SCHEMA_VERSION,
            entries: BTreeMap::new(),
            entries_digest: None,
        }
    }
}

impl BuildManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, route_id: &str) -> Option<&ManifestEntry> {
        self.entries.get(route_id)
    }

    /// Record a successful compile of `route_id`
    pub fn record(
        &mut self,
        route_id: impl Into<String>,
        fingerprint: RouteFingerprint,
        route_key: impl Into<String>,
    ) {
        self.entries.insert(
            route_id.into(),
            ManifestEntry {
                fingerprint,
                route_key: route_key.into(),
            },
        );
        self.entries_digest = None;
    }

    /// Drop entries for routes that no longer exist; returns the dropped ids
    pub fn retain_routes<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let dropped: Vec<String> = self
            .entries
            .keys()
            .filter(|id| !keep(id))
            .cloned()
            .collect();
        for id in &dropped {
            self.entries.remove(id);
        }
        if !dropped.is_empty() {
            self.entries_digest = None;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// SHA-256 over the canonical JSON of `entries`
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn digest(&self) -> Result<String> {
        let canonical = serde_json::to_vec(&self.entries)?;
        Ok(sha256_hex(&canonical))
    }

    /// Store the current digest so the persisted file carries it
    pub fn seal(&mut self) -> Result<()> {
        self.entries_digest = Some(self.digest()?);
        Ok(())
    }

    /// Check a manifest read back from disk
    ///
    /// # Errors
    ///
    /// Returns `InvalidManifest` for an unknown schema version or a digest
    /// that does not match the entries.
    pub fn verify(&self) -> Result<()> {
        if self.manifest_schema_version != MANIFEST_SCHEMA_VERSION {
            return Err(KernelError::InvalidManifest {
                reason: format!(
                    "unsupported manifest schema version {} (expected {})",
                    self.manifest_schema_version, MANIFEST_SCHEMA_VERSION
                ),
            });
        }
        if let Some(recorded) = &self.entries_digest {
            let actual = self.digest()?;
            if recorded != &actual {
                return Err(KernelError::InvalidManifest {
                    reason: format!("digest mismatch: recorded {}, computed {}", recorded, actual),
                });
            }
        }
        Ok(())
    }
}
