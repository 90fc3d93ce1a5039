use shopfront_core::errors::{KernelError, SfError, SfErrorKind};

#[test]
fn test_locked_registry_verifiable_by_kind() {
    let err: SfError = KernelError::RegistryLocked {
        extension_point: "cartFields".to_string(),
    }
    .into();

    assert_eq!(err.kind(), SfErrorKind::RegistryLocked);
    assert_eq!(err.code(), "ERR_REGISTRY_LOCKED");
    assert_eq!(err.extension_point(), Some("cartFields"));
    assert!(err.kind().is_programming_error());
}

#[test]
fn test_hooks_locked_distinct_from_registry_locked() {
    let err: SfError = KernelError::HooksLocked {
        function_name: "placeOrder".to_string(),
    }
    .into();

    assert_eq!(err.kind(), SfErrorKind::HooksLocked);
    assert_ne!(err.kind(), SfErrorKind::RegistryLocked);
    assert_eq!(err.code(), "ERR_HOOKS_LOCKED");
}

#[test]
fn test_bootstrap_failure_carries_module() {
    let err: SfError = KernelError::BootstrapFailed {
        module: "loyalty".to_string(),
        reason: "missing table".to_string(),
    }
    .into();

    assert_eq!(err.kind(), SfErrorKind::BootstrapFailed);
    assert_eq!(err.module(), Some("loyalty"));
    assert!(err.message().contains("missing table"));
    assert!(!err.kind().is_programming_error());
}

#[test]
fn test_route_errors_carry_route_identity() {
    let err: SfError = KernelError::InvalidRoute {
        module: "catalog".to_string(),
        route: "productView".to_string(),
        reason: "url pattern must start with '/'".to_string(),
    }
    .into();
    assert_eq!(err.kind(), SfErrorKind::InvalidRoute);
    assert_eq!(err.module(), Some("catalog"));
    assert_eq!(err.route(), Some("productView"));

    let err: SfError = KernelError::DuplicateRouteId {
        route: "home".to_string(),
        existing: "GET /".to_string(),
        incoming: "GET /home".to_string(),
    }
    .into();
    assert_eq!(err.code(), "ERR_DUPLICATE_ROUTE_ID");
    assert_eq!(err.route(), Some("home"));
}

#[test]
fn test_config_violations_joined_in_message() {
    let err = KernelError::InvalidConfig {
        violations: vec!["/shop/currency: required property is missing".into(), "/x: bad".into()],
    };
    assert_eq!(
        err.to_string(),
        "Invalid configuration: /shop/currency: required property is missing; /x: bad"
    );
    let sf: SfError = err.into();
    assert_eq!(sf.kind(), SfErrorKind::InvalidConfig);
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (SfErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
        (SfErrorKind::InvalidSchema, "ERR_INVALID_SCHEMA"),
        (SfErrorKind::InvalidRoute, "ERR_INVALID_ROUTE"),
        (SfErrorKind::ProcessorFailed, "ERR_PROCESSOR_FAILED"),
        (SfErrorKind::HookFailed, "ERR_HOOK_FAILED"),
        (SfErrorKind::CompileFailed, "ERR_COMPILE_FAILED"),
        (SfErrorKind::Timeout, "ERR_TIMEOUT"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_source_chain_rendered() {
    let cause = SfError::new(SfErrorKind::Io)
        .with_path("/build/manifest.json")
        .with_message("permission denied");
    let err = SfError::new(SfErrorKind::CompileFailed)
        .with_op("build")
        .with_message("could not persist manifest")
        .with_source(cause);

    let rendered = err.to_string();
    assert!(rendered.contains("ERR_COMPILE_FAILED"));
    assert!(rendered.contains("permission denied"));
    assert_eq!(
        err.source_error().map(SfError::kind),
        Some(SfErrorKind::Io)
    );
}
