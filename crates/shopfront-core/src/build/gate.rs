//! Build Gate
//!
//! Decides per route whether its client bundle must be recompiled. The
//! decision itself ([`requires_build`]) is a pure function of the route's
//! fingerprint, the previous manifest and whether prior output exists.
//! [`BuildGate`] wires that function to an injected [`Fingerprinter`] and
//! [`OutputProbe`] and writes the result into each route's
//! `build_required` flag.

use serde::Serialize;

use super::fingerprint::{fingerprint_route, source_files, Fingerprinter, RouteFingerprint};
use super::manifest::BuildManifest;
use crate::errors::SfError;
use crate::route::RouteTable;

/// Why a route does or does not need a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildDecision {
    /// Fingerprint matches and output exists
    UpToDate,
    /// No manifest entry for the route
    NoPriorBuild,
    FingerprintChanged,
    /// Manifest entry matches but the bundle is gone from disk
    OutputMissing,
    /// Rebuild requested regardless of state
    Forced,
    /// Api route; never bundled
    NotApplicable,
}

impl BuildDecision {
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            BuildDecision::NoPriorBuild
                | BuildDecision::FingerprintChanged
                | BuildDecision::OutputMissing
                | BuildDecision::Forced
        )
    }
}

impl std::fmt::Display for BuildDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildDecision::UpToDate => "up to date",
            BuildDecision::NoPriorBuild => "no prior build",
            BuildDecision::FingerprintChanged => "fingerprint changed",
            BuildDecision::OutputMissing => "output missing",
            BuildDecision::Forced => "forced",
            BuildDecision::NotApplicable => "not applicable",
        };
        f.write_str(s)
    }
}

/// Reports whether prior build output exists for a route
pub trait OutputProbe {
    fn has_output(&self, route_id: &str) -> bool;
}

/// Pure build decision for one page route
pub fn requires_build(
    route_id: &str,
    fingerprint: &RouteFingerprint,
    manifest: &BuildManifest,
    output_present: bool,
) -> BuildDecision {
    match manifest.get(route_id) {
        None => BuildDecision::NoPriorBuild,
        Some(entry) if &entry.fingerprint != fingerprint => BuildDecision::FingerprintChanged,
        Some(_) if !output_present => BuildDecision::OutputMissing,
        Some(_) => BuildDecision::UpToDate,
    }
}

/// Outcome for one route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub route_id: String,
    pub route_key: String,
    pub decision: BuildDecision,
    /// None for api routes
    pub fingerprint: Option<RouteFingerprint>,
}

/// Per-route decisions in route-table order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GateReport {
    pub decisions: Vec<RouteDecision>,
}

impl GateReport {
    /// Routes that need a build
    pub fn required(&self) -> impl Iterator<Item = &RouteDecision> {
        self.decisions.iter().filter(|d| d.decision.is_required())
    }

    pub fn required_count(&self) -> usize {
        self.required().count()
    }

    pub fn get(&self, route_id: &str) -> Option<&RouteDecision> {
        self.decisions.iter().find(|d| d.route_id == route_id)
    }
}

pub struct BuildGate<'a> {
    fingerprinter: &'a dyn Fingerprinter,
    probe: &'a dyn OutputProbe,
    force: bool,
}

impl<'a> BuildGate<'a> {
    pub fn new(fingerprinter: &'a dyn Fingerprinter, probe: &'a dyn OutputProbe) -> Self {
        Self {
            fingerprinter,
            probe,
            force: false,
        }
    }

    /// Mark every page route as requiring a build
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Fingerprint every route and set its `build_required` flag
    ///
    /// # Errors
    ///
    /// Fails if a source file cannot be stamped (other than being missing)
    /// or a fingerprint cannot be encoded.
    pub fn evaluate(
        &self,
        routes: &mut RouteTable,
        manifest: &BuildManifest,
    ) -> Result<GateReport, SfError> {
        let mut report = GateReport::default();

        for route in routes.iter_mut() {
            let route_key = route.key.to_string();
            if !route.is_page() {
                route.build_required = false;
                report.decisions.push(RouteDecision {
                    route_id: route.id.clone(),
                    route_key,
                    decision: BuildDecision::NotApplicable,
                    fingerprint: None,
                });
                continue;
            }

            let stamps = source_files(route)
                .iter()
                .map(|path| self.fingerprinter.stamp(path))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.with_route(route.id.clone()))?;
            let fingerprint = fingerprint_route(route, &stamps)
                .map_err(|e| SfError::from(e).with_route(route.id.clone()))?;

            let decision = if self.force {
                BuildDecision::Forced
            } else {
                requires_build(
                    &route.id,
                    &fingerprint,
                    manifest,
                    self.probe.has_output(&route.id),
                )
            };
            route.build_required = decision.is_required();

            tracing::debug!(
                component = module_path!(),
                route_id = %route.id,
                route_key = %route_key,
                decision = %decision,
                "build gate decision"
            );
            report.decisions.push(RouteDecision {
                route_id: route.id.clone(),
                route_key,
                decision,
                fingerprint: Some(fingerprint),
            });
        }

        Ok(report)
    }
}

/// Manifest route ids with no matching page route in `routes`
pub fn stale_routes(routes: &RouteTable, manifest: &BuildManifest) -> Vec<String> {
    manifest
        .entries
        .keys()
        .filter(|id| routes.get_by_id(id).map_or(true, |r| !r.is_page()))
        .cloned()
        .collect()
}
