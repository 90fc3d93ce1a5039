use thiserror::Error;

/// Result type alias using KernelError
pub type Result<T> = std::result::Result<T, KernelError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in the Shopfront kernel. Each kind maps to a stable error code that can be
/// used for programmatic error handling, testing, and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfErrorKind {
    // Configuration
    InvalidConfig,
    InvalidSchema,
    InvalidModule,
    DuplicateModule,
    InvalidRoute,
    DuplicateRouteId,
    InvalidManifest,

    // Extensibility mutation
    RegistryLocked,
    HooksLocked,
    DuplicateFinalProcessor,
    DuplicateReplaceHook,

    // Extensibility execution
    ProcessorFailed,
    HookFailed,
    BootstrapFailed,

    // Build
    CompileFailed,

    // Integration/IO
    NotFound,
    Io,
    Serialization,
    Timeout,
}

impl SfErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            SfErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            SfErrorKind::InvalidSchema => "ERR_INVALID_SCHEMA",
            SfErrorKind::InvalidModule => "ERR_INVALID_MODULE",
            SfErrorKind::DuplicateModule => "ERR_DUPLICATE_MODULE",
            SfErrorKind::InvalidRoute => "ERR_INVALID_ROUTE",
            SfErrorKind::DuplicateRouteId => "ERR_DUPLICATE_ROUTE_ID",
            SfErrorKind::InvalidManifest => "ERR_INVALID_MANIFEST",
            SfErrorKind::RegistryLocked => "ERR_REGISTRY_LOCKED",
            SfErrorKind::HooksLocked => "ERR_HOOKS_LOCKED",
            SfErrorKind::DuplicateFinalProcessor => "ERR_DUPLICATE_FINAL_PROCESSOR",
            SfErrorKind::DuplicateReplaceHook => "ERR_DUPLICATE_REPLACE_HOOK",
            SfErrorKind::ProcessorFailed => "ERR_PROCESSOR_FAILED",
            SfErrorKind::HookFailed => "ERR_HOOK_FAILED",
            SfErrorKind::BootstrapFailed => "ERR_BOOTSTRAP_FAILED",
            SfErrorKind::CompileFailed => "ERR_COMPILE_FAILED",
            SfErrorKind::NotFound => "ERR_NOT_FOUND",
            SfErrorKind::Io => "ERR_IO",
            SfErrorKind::Serialization => "ERR_SERIALIZATION",
            SfErrorKind::Timeout => "ERR_TIMEOUT",
        }
    }

    /// Whether this kind signals a programming error in a module rather than
    /// bad input (mutation after lock, duplicate single-slot registration).
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            SfErrorKind::RegistryLocked
                | SfErrorKind::HooksLocked
                | SfErrorKind::DuplicateFinalProcessor
                | SfErrorKind::DuplicateReplaceHook
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus the kernel identities (module,
/// extension point, route, path) that fatal diagnostics must report.
#[derive(Debug, Clone)]
pub struct SfError {
    kind: SfErrorKind,
    op: Option<String>,
    module: Option<String>,
    extension_point: Option<String>,
    route: Option<String>,
    path: Option<String>,
    message: String,
    source: Option<Box<SfError>>,
}

impl SfError {
    /// Create a new error with the specified kind
    pub fn new(kind: SfErrorKind) -> Self {
        Self {
            kind,
            op: None,
            module: None,
            extension_point: None,
            route: None,
            path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add module context
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Add extension point (or hooked function) context
    pub fn with_extension_point(mut self, name: impl Into<String>) -> Self {
        self.extension_point = Some(name.into());
        self
    }

    /// Add route identity context
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: SfError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> SfErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the module context, if any
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Get the extension point context, if any
    pub fn extension_point(&self) -> Option<&str> {
        self.extension_point.as_deref()
    }

    /// Get the route context, if any
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&SfError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for SfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(module) = &self.module {
            write!(f, " (module: {})", module)?;
        }
        if let Some(point) = &self.extension_point {
            write!(f, " (extension_point: {})", point)?;
        }
        if let Some(route) = &self.route {
            write!(f, " (route: {})", route)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for SfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for kernel operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    // ===== Lock Errors =====
    /// Processor registration attempted after the lock transition
    #[error("Registry is locked: cannot register at extension point '{extension_point}'")]
    RegistryLocked { extension_point: String },

    /// Hook registration attempted after the lock transition
    #[error("Hook table is locked: cannot hook function '{function_name}'")]
    HooksLocked { function_name: String },

    // ===== Registration Errors =====
    /// A final processor already exists for this extension point
    #[error("Extension point '{extension_point}' already has a final processor")]
    DuplicateFinalProcessor { extension_point: String },

    /// A replace hook already exists for this function
    #[error("Function '{function_name}' already has a replace hook")]
    DuplicateReplaceHook { function_name: String },

    // ===== Execution Errors =====
    /// A processor failed while folding an extension point
    #[error("Processor #{index} at extension point '{extension_point}' failed: {reason}")]
    ProcessorFailed {
        extension_point: String,
        index: usize,
        reason: String,
    },

    /// The final processor failed
    #[error("Final processor at extension point '{extension_point}' failed: {reason}")]
    FinalProcessorFailed {
        extension_point: String,
        reason: String,
    },

    /// A hook, replacement or original function failed
    #[error("{kind} hook on '{function_name}' failed: {reason}")]
    HookFailed {
        function_name: String,
        kind: String,
        reason: String,
    },

    /// A module's bootstrap contribution failed
    #[error("Bootstrap of module '{module}' failed: {reason}")]
    BootstrapFailed { module: String, reason: String },

    // ===== Module Errors =====
    /// Module descriptor is malformed
    #[error("Invalid module descriptor '{module}': {reason}")]
    InvalidModuleDescriptor { module: String, reason: String },

    /// Two modules share a name
    #[error("Duplicate module name: {module}")]
    DuplicateModule { module: String },

    // ===== Route Errors =====
    /// Route declaration is malformed
    #[error("Invalid route '{route}' in module '{module}': {reason}")]
    InvalidRoute {
        module: String,
        route: String,
        reason: String,
    },

    /// Two live routes with different keys share an id
    #[error("Route id '{route}' is declared by both {existing} and {incoming}")]
    DuplicateRouteId {
        route: String,
        existing: String,
        incoming: String,
    },

    // ===== Configuration Errors =====
    /// A schema contribution could not be merged
    #[error("Invalid config schema: {reason}")]
    InvalidConfigSchema { reason: String },

    /// Runtime settings failed validation against the merged schema
    #[error("Invalid configuration: {}", violations.join("; "))]
    InvalidConfig { violations: Vec<String> },

    // ===== Build Errors =====
    /// Build manifest content is unusable
    #[error("Invalid build manifest: {reason}")]
    InvalidManifest { reason: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from KernelError to SfError
impl From<KernelError> for SfError {
    fn from(err: KernelError) -> Self {
        let message = err.to_string();
        match err {
            KernelError::RegistryLocked { extension_point } => {
                SfError::new(SfErrorKind::RegistryLocked)
                    .with_op("add_processor")
                    .with_extension_point(extension_point)
                    .with_message(message)
            }
            KernelError::HooksLocked { function_name } => SfError::new(SfErrorKind::HooksLocked)
                .with_op("add_hook")
                .with_extension_point(function_name)
                .with_message(message),
            KernelError::DuplicateFinalProcessor { extension_point } => {
                SfError::new(SfErrorKind::DuplicateFinalProcessor)
                    .with_op("add_final_processor")
                    .with_extension_point(extension_point)
                    .with_message(message)
            }
            KernelError::DuplicateReplaceHook { function_name } => {
                SfError::new(SfErrorKind::DuplicateReplaceHook)
                    .with_op("add_hook")
                    .with_extension_point(function_name)
                    .with_message(message)
            }
            KernelError::ProcessorFailed {
                extension_point, ..
            }
            | KernelError::FinalProcessorFailed {
                extension_point, ..
            } => SfError::new(SfErrorKind::ProcessorFailed)
                .with_op("run_processors")
                .with_extension_point(extension_point)
                .with_message(message),
            KernelError::HookFailed { function_name, .. } => SfError::new(SfErrorKind::HookFailed)
                .with_op("call_composed")
                .with_extension_point(function_name)
                .with_message(message),
            KernelError::BootstrapFailed { module, .. } => {
                SfError::new(SfErrorKind::BootstrapFailed)
                    .with_op("bootstrap")
                    .with_module(module)
                    .with_message(message)
            }
            KernelError::InvalidModuleDescriptor { module, .. } => {
                SfError::new(SfErrorKind::InvalidModule)
                    .with_module(module)
                    .with_message(message)
            }
            KernelError::DuplicateModule { module } => SfError::new(SfErrorKind::DuplicateModule)
                .with_module(module)
                .with_message(message),
            KernelError::InvalidRoute { module, route, .. } => {
                SfError::new(SfErrorKind::InvalidRoute)
                    .with_module(module)
                    .with_route(route)
                    .with_message(message)
            }
            KernelError::DuplicateRouteId { route, .. } => {
                SfError::new(SfErrorKind::DuplicateRouteId)
                    .with_route(route)
                    .with_message(message)
            }
            KernelError::InvalidConfigSchema { .. } => {
                SfError::new(SfErrorKind::InvalidSchema).with_message(message)
            }
            KernelError::InvalidConfig { .. } => SfError::new(SfErrorKind::InvalidConfig)
                .with_op("validate_config")
                .with_message(message),
            KernelError::InvalidManifest { .. } => {
                SfError::new(SfErrorKind::InvalidManifest).with_message(message)
            }
            KernelError::Serialization { .. } => {
                SfError::new(SfErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to KernelError
impl From<serde_json::Error> for KernelError {
    fn from(err: serde_json::Error) -> Self {
        KernelError::Serialization {
            message: err.to_string(),
        }
    }
}
