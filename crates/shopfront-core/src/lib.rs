//! Shopfront Core - extensibility kernel
//!
//! Pure, filesystem-free building blocks of the storefront kernel:
//! - Extension-point [`Registry`] folding ordered processors
//! - [`HookTable`] composing before/after/replace hooks around functions
//! - One-shot [`LockController`] ending the bootstrap phase
//! - Module descriptors, route table with last-writer-wins overrides
//! - Config schema merging, defaults and validation
//! - Build gate, build manifest and bundler entry generation
//!
//! Filesystem access lives in `shopfront-store`; orchestration in
//! `shopfront-engine`.

pub mod bootstrap;
pub mod build;
pub mod compile;
pub mod config_schema;
pub mod errors;
pub mod hooks;
pub mod lock;
pub mod logging_facility;
pub mod module;
pub mod registry;
pub mod route;

// Re-export commonly used types
pub use bootstrap::{Bootstrap, BootstrapCatalog, BootstrapContext, FnBootstrap};
pub use build::{BuildDecision, BuildGate, BuildManifest, RouteFingerprint};
pub use compile::{CompileRequest, CompileTarget, Compiler, FailingCompiler, NoopCompiler};
pub use config_schema::{ConfigSchema, SchemaViolation};
pub use errors::{KernelError, Result, SfError, SfErrorKind};
pub use hooks::{
    AfterHook, BeforeHook, BeforeOutcome, Callable, ComposedFunction, HookAction, HookArgs,
    HookKind, HookTable,
};
pub use lock::{LockController, Phase};
pub use module::{ModuleDescriptor, ModuleKind, ModuleSet};
pub use registry::{Processor, Registry};
pub use route::{
    ComponentRef, HttpMethod, LayoutSlot, RouteEntry, RouteKey, RouteKind, RouteOverride,
    RouteTable,
};
