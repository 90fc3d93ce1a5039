//! Subcommand implementations

pub mod build;
pub mod check;
pub mod routes;

use std::time::Duration;

/// `--timeout-ms` value as a phase timeout (0 disables it)
fn phase_timeout(timeout_ms: u64) -> Option<Duration> {
    (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms))
}
