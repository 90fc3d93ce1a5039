//! Build gate over real files: fingerprints, bundle output and the manifest

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::Project;
use shopfront_core::build::{BuildDecision, BuildGate, BuildManifest};
use shopfront_core::{ModuleDescriptor, RouteTable};
use shopfront_store::{
    discover_route_files, load_manifest, parse_route_file, save_manifest, BuildDir,
    FsFingerprinter,
};

fn load_table(module: &ModuleDescriptor) -> RouteTable {
    let mut table = RouteTable::new();
    for file in discover_route_files(module).unwrap() {
        table.insert(parse_route_file(module, &file).unwrap()).unwrap();
    }
    table
}

#[test]
fn test_gate_tracks_source_edits_and_output() {
    let project = Project::new();
    project.write(
        "base/routes/home/route.yaml",
        "urlPattern: /\nmethod: GET\ncomponents:\n  - { path: Home.jsx, areaId: content }\n",
    );
    let component = project.write("base/routes/home/Home.jsx", "v1");
    let module = ModuleDescriptor::core("base", project.root().join("base"));
    let build_dir = BuildDir::new(project.root().join("build"));

    let decide = |manifest: &BuildManifest| {
        let mut table = load_table(&module);
        let report = BuildGate::new(&FsFingerprinter, &build_dir)
            .evaluate(&mut table, manifest)
            .unwrap();
        let decision = report.get("home").unwrap().clone();
        assert_eq!(
            table.get_by_id("home").unwrap().build_required,
            decision.decision.is_required()
        );
        decision
    };

    // No manifest yet
    let mut manifest = load_manifest(&build_dir).unwrap();
    let first = decide(&manifest);
    assert_eq!(first.decision, BuildDecision::NoPriorBuild);

    // Fingerprint recorded but the bundle was never completed
    build_dir.prepare(&["home"], &[]).unwrap();
    manifest.record("home", first.fingerprint.unwrap(), first.route_key);
    save_manifest(&build_dir, &mut manifest).unwrap();
    let manifest = load_manifest(&build_dir).unwrap();
    assert_eq!(decide(&manifest).decision, BuildDecision::OutputMissing);

    // Successful build
    build_dir.mark_complete("home").unwrap();
    assert_eq!(decide(&manifest).decision, BuildDecision::UpToDate);

    // Component edit
    std::fs::write(&component, "v2 with more bytes").unwrap();
    assert_eq!(decide(&manifest).decision, BuildDecision::FingerprintChanged);

    // Restore content but lose the bundle
    std::fs::write(&component, "v1").unwrap();
    std::fs::remove_dir_all(build_dir.bundle_dir("home")).unwrap();
    let decision = decide(&manifest).decision;
    assert!(
        decision == BuildDecision::OutputMissing || decision == BuildDecision::FingerprintChanged,
        "unexpected {decision:?}"
    );
    assert!(decision.is_required());
}

#[test]
fn test_deleted_component_still_fingerprints() {
    let project = Project::new();
    project.write(
        "base/routes/home/route.yaml",
        "urlPattern: /\nmethod: GET\ncomponents:\n  - { path: Missing.jsx, areaId: content }\n",
    );
    let module = ModuleDescriptor::core("base", project.root().join("base"));
    let build_dir = BuildDir::new(project.root().join("build"));

    let mut table = load_table(&module);
    let report = BuildGate::new(&FsFingerprinter, &build_dir)
        .evaluate(&mut table, &load_manifest(&build_dir).unwrap())
        .unwrap();
    assert!(report.get("home").unwrap().fingerprint.is_some());
}
