//! Build orchestrator over a real project: gate, entries, compile, manifest

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::fs;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use common::Shop;
use shopfront_core::logging_facility::test_capture::init_test_capture;
use shopfront_core::{
    BootstrapCatalog, BuildDecision, CompileRequest, Compiler, FailingCompiler, NoopCompiler,
    SfError, SfErrorKind,
};
use shopfront_engine::{build, start, BuildOptions, BuildReport, CommandCompiler, Kernel, StartupOptions};
use shopfront_store::{load_manifest, AppConfig, BuildDir};

const CONFIG: &str = "modules:\n  - { name: base, path: base }\n  - { name: account, path: account }\n";

/// Remembers every request it was handed
#[derive(Default)]
struct RecordingCompiler {
    requests: Mutex<Vec<CompileRequest>>,
}

impl RecordingCompiler {
    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> CompileRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Compiler for RecordingCompiler {
    async fn compile(&self, request: &CompileRequest) -> Result<(), SfError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

struct StalledCompiler;

#[async_trait]
impl Compiler for StalledCompiler {
    async fn compile(&self, _request: &CompileRequest) -> Result<(), SfError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

fn shop() -> (Shop, AppConfig) {
    let shop = Shop::new();
    shop.page("base", "home", "/", "Home.jsx");
    shop.page("account", "profile", "/account", "Profile.jsx");
    shop.write(
        "account/routes/login/route.yaml",
        "urlPattern: /api/login\nmethod: POST\nkind: api\nhandlers: [account/login]\n",
    );
    let config = shop.config(CONFIG);
    (shop, config)
}

async fn kernel(config: &AppConfig) -> Kernel {
    start(config, &BootstrapCatalog::new(), &StartupOptions::default())
        .await
        .unwrap()
}

async fn run(
    config: &AppConfig,
    build_dir: &BuildDir,
    compiler: &dyn Compiler,
    options: &BuildOptions,
) -> shopfront_store::Result<BuildReport> {
    build(&mut kernel(config).await, build_dir, compiler, options).await
}

#[tokio::test]
async fn test_gate_drives_incremental_builds() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    let compiler = RecordingCompiler::default();
    let options = BuildOptions::default();

    // GIVEN no manifest: every page route builds, api routes never do
    let first = run(&config, &build_dir, &compiler, &options).await.unwrap();
    assert_eq!(first.built, vec!["home", "profile"]);
    assert_eq!(first.not_applicable, vec!["login"]);
    assert_eq!(
        first.gate.get("home").unwrap().decision,
        BuildDecision::NoPriorBuild
    );
    assert_eq!(compiler.calls(), 1);
    assert_eq!(load_manifest(&build_dir).unwrap().len(), 2);

    // WHEN nothing changed THEN nothing builds and the compiler is not called
    let second = run(&config, &build_dir, &compiler, &options).await.unwrap();
    assert!(second.built.is_empty());
    assert_eq!(second.up_to_date, vec!["home", "profile"]);
    assert_eq!(second.manifest_digest, first.manifest_digest);
    assert_eq!(compiler.calls(), 1);

    // WHEN one component changes THEN only its route rebuilds
    shop.write("account/routes/profile/Profile.jsx", "export default () => 'v2';\n");
    let third = run(&config, &build_dir, &compiler, &options).await.unwrap();
    assert_eq!(third.built, vec!["profile"]);
    assert_eq!(
        third.gate.get("profile").unwrap().decision,
        BuildDecision::FingerprintChanged
    );
    assert_eq!(compiler.last().route_ids(), vec!["profile"]);
    assert_ne!(third.manifest_digest, first.manifest_digest);

    // THEN the recorded fingerprint makes the next run a no-op again
    let fourth = run(&config, &build_dir, &compiler, &options).await.unwrap();
    assert!(fourth.built.is_empty());
    assert_eq!(compiler.calls(), 2);
}

#[tokio::test]
async fn test_entries_and_compile_request_written() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    let compiler = RecordingCompiler::default();

    let mut kernel = kernel(&config).await;
    build(&mut kernel, &build_dir, &compiler, &BuildOptions::default())
        .await
        .unwrap();

    assert!(kernel.routes.get_by_id("home").unwrap().build_required);
    assert!(!kernel.routes.get_by_id("login").unwrap().build_required);

    let request = compiler.last();
    assert_eq!(request.run_id, kernel.run_id.as_str());
    let home = &request.targets[0];
    assert_eq!(home.route_key, "GET /");
    assert_eq!(home.entry, build_dir.entry_path("home"));
    assert_eq!(home.output_dir, build_dir.bundle_dir("home"));
    assert!(home.output_dir.is_dir());

    let entry = fs::read_to_string(&home.entry).unwrap();
    assert!(entry.contains("Home.jsx"), "{entry}");
    assert!(!build_dir.entry_path("login").exists());

    let persisted: CompileRequest =
        serde_json::from_slice(&fs::read(build_dir.compile_request_path()).unwrap()).unwrap();
    assert_eq!(persisted, request);
}

#[tokio::test]
async fn test_failed_compile_leaves_manifest_untouched() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();
    let before = fs::read(build_dir.manifest_path()).unwrap();

    shop.write("base/routes/home/Home.jsx", "broken(");
    let err = run(
        &config,
        &build_dir,
        &FailingCompiler::new("syntax error in Home.jsx"),
        &BuildOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), SfErrorKind::CompileFailed);
    assert_eq!(fs::read(build_dir.manifest_path()).unwrap(), before);

    // The same route is still pending on the next run
    let retry = run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();
    assert_eq!(retry.built, vec!["home"]);
}

#[tokio::test]
async fn test_compile_timeout_is_fatal() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    let options = BuildOptions {
        force: false,
        phase_timeout: Some(Duration::from_millis(50)),
    };

    let err = run(&config, &build_dir, &StalledCompiler, &options)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SfErrorKind::Timeout);
    assert_eq!(err.op(), Some("compile"));
    assert!(!build_dir.manifest_path().exists());
}

#[tokio::test]
async fn test_removed_route_is_pruned() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();
    assert!(build_dir.bundle_dir("profile").is_dir());

    shop.remove("account/routes/profile");
    let report = run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();

    assert_eq!(report.removed, vec!["profile"]);
    assert!(!build_dir.bundle_dir("profile").exists());
    assert!(build_dir.bundle_dir("home").is_dir());
    assert!(load_manifest(&build_dir).unwrap().get("profile").is_none());
}

#[tokio::test]
async fn test_missing_bundle_output_triggers_rebuild() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();

    fs::remove_dir_all(build_dir.bundle_dir("home")).unwrap();
    let report = run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();
    assert_eq!(report.built, vec!["home"]);
    assert_eq!(
        report.gate.get("home").unwrap().decision,
        BuildDecision::OutputMissing
    );
}

#[tokio::test]
async fn test_failed_compile_does_not_restore_lost_output() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();

    // GIVEN the bundle is lost and the next compile fails
    fs::remove_dir_all(build_dir.bundle_dir("home")).unwrap();
    run(
        &config,
        &build_dir,
        &FailingCompiler::new("bundler crashed"),
        &BuildOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(!build_dir.has_output("home"));

    // THEN the half-prepared bundle directory does not count as output
    let compiler = RecordingCompiler::default();
    let report = run(&config, &build_dir, &compiler, &BuildOptions::default())
        .await
        .unwrap();
    assert_eq!(report.built, vec!["home"]);
    assert_eq!(
        report.gate.get("home").unwrap().decision,
        BuildDecision::OutputMissing
    );
    assert_eq!(compiler.last().route_ids(), vec!["home"]);
    assert!(build_dir.has_output("home"));
}

#[tokio::test]
async fn test_force_wipes_and_rebuilds_every_page_route() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();
    let leftover = shop.write(".shopfront/build/bundles/ghost/app.js", "old");

    let report = run(
        &config,
        &build_dir,
        &NoopCompiler,
        &BuildOptions {
            force: true,
            phase_timeout: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(report.built, vec!["home", "profile"]);
    assert!(report
        .gate
        .required()
        .all(|d| d.decision == BuildDecision::Forced));
    assert_eq!(
        report.gate.get("login").unwrap().decision,
        BuildDecision::NotApplicable
    );
    assert!(!leftover.exists());
}

#[tokio::test]
async fn test_corrupt_manifest_needs_force() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    shop.write(".shopfront/build/manifest.json", "{ not json");

    let err = run(&config, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SfErrorKind::InvalidManifest);

    let report = run(
        &config,
        &build_dir,
        &NoopCompiler,
        &BuildOptions {
            force: true,
            phase_timeout: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(report.built.len(), 2);
    assert_eq!(load_manifest(&build_dir).unwrap().len(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_compiler_receives_request_path() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    let compiler = CommandCompiler::new("sh").with_args([
        "-c",
        "test -f \"$SHOPFRONT_COMPILE_REQUEST\" && cp \"$SHOPFRONT_COMPILE_REQUEST\" seen.json",
    ]);

    run(&config, &build_dir, &compiler, &BuildOptions::default())
        .await
        .unwrap();
    assert!(build_dir.root().join("seen.json").is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_compiler_nonzero_exit_fails_build() {
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    let compiler = CommandCompiler::new("sh").with_args(["-c", "echo bundler exploded >&2; exit 3"]);

    let err = run(&config, &build_dir, &compiler, &BuildOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SfErrorKind::CompileFailed);
    assert!(err.message().contains("bundler exploded"), "{err}");
    assert!(!build_dir.manifest_path().exists());
}

#[tokio::test]
async fn test_build_logged_with_run_id() {
    let capture = init_test_capture();
    let (shop, config) = shop();
    let build_dir = shop.build_dir();
    let mut kernel = kernel(&config).await;

    build(&mut kernel, &build_dir, &NoopCompiler, &BuildOptions::default())
        .await
        .unwrap();

    let events = capture.events_for_run(kernel.run_id.as_str());
    let end = events
        .iter()
        .find(|e| e.op() == Some("build") && e.event() == Some("end"))
        .unwrap();
    assert_eq!(end.field("build_count"), Some("2"));
    assert!(events
        .iter()
        .any(|e| e.op() == Some("build") && e.event() == Some("start")));
}
