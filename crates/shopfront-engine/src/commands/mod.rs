//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging for kernel phases:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Every phase event carries the `run_id` of the invocation. Lower layers
//! (store, core) use only `tracing::debug!()`/`warn!()` for internal details.

pub mod bootstrap;
pub mod build;
pub mod compiler;
pub mod routes;
pub mod startup;

/// Milliseconds elapsed since `start`, for `duration_ms` fields
pub(crate) fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
