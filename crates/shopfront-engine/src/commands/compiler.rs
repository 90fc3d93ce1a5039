//! External-command compile collaborator.
//!
//! The build orchestrator writes the compile request to
//! `<build_dir>/compile-request.json`; the configured program receives that
//! path in `SHOPFRONT_COMPILE_REQUEST` and must write each target's bundle to
//! its `output_dir`.

use std::process::Stdio;

use async_trait::async_trait;
use shopfront_core::{CompileRequest, Compiler, SfError, SfErrorKind};
use shopfront_store::build_dir::COMPILE_REQUEST_FILE;

pub const COMPILE_REQUEST_ENV: &str = "SHOPFRONT_COMPILE_REQUEST";

/// Runs `program args...` once per build
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a shell-style command line split on whitespace
    ///
    /// Returns `None` for a blank command line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn failed(&self, message: String) -> SfError {
        SfError::new(SfErrorKind::CompileFailed)
            .with_op("compile")
            .with_message(message)
    }
}

#[async_trait]
impl Compiler for CommandCompiler {
    async fn compile(&self, request: &CompileRequest) -> Result<(), SfError> {
        let request_path = request.build_dir.join(COMPILE_REQUEST_FILE);
        tracing::debug!(
            component = module_path!(),
            program = %self.program,
            targets = request.targets.len(),
            "spawning compiler"
        );

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .env(COMPILE_REQUEST_ENV, &request_path)
            .current_dir(&request.build_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.failed(format!("cannot run '{}': {}", self.program, e)))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        Err(self.failed(if detail.is_empty() {
            format!("'{}' exited with {}", self.program, output.status)
        } else {
            format!("'{}' exited with {}: {}", self.program, output.status, detail)
        }))
    }
}
