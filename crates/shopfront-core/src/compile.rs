//! Compile collaborator interface.
//!
//! The build orchestrator hands the compiler the override-resolved set of
//! routes that need bundles, each with its generated entry module and the
//! directory its bundle must be written to. Bundler internals are opaque;
//! the only contract is that a failed compile returns an error.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{SfError, SfErrorKind};

/// One route to compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileTarget {
    pub route_id: String,
    pub route_key: String,
    pub entry: PathBuf,
    pub output_dir: PathBuf,
}

/// The full entry set of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    pub run_id: String,
    pub build_dir: PathBuf,
    pub targets: Vec<CompileTarget>,
}

impl CompileRequest {
    pub fn route_ids(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.route_id.as_str()).collect()
    }
}

#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile every target in `request`
    ///
    /// # Errors
    ///
    /// Any error fails the whole build; the manifest is left untouched.
    async fn compile(&self, request: &CompileRequest) -> Result<(), SfError>;
}

/// Accepts every request without producing output
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCompiler;

#[async_trait]
impl Compiler for NoopCompiler {
    async fn compile(&self, request: &CompileRequest) -> Result<(), SfError> {
        tracing::debug!(
            component = module_path!(),
            targets = request.targets.len(),
            "noop compile"
        );
        Ok(())
    }
}

/// Rejects every request
#[derive(Debug, Clone, Default)]
pub struct FailingCompiler {
    reason: String,
}

impl FailingCompiler {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Compiler for FailingCompiler {
    async fn compile(&self, _request: &CompileRequest) -> Result<(), SfError> {
        Err(SfError::new(SfErrorKind::CompileFailed)
            .with_op("compile")
            .with_message(self.reason.clone()))
    }
}
