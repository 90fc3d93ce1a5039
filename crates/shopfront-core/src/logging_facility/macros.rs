//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log kernel phases.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use shopfront_core::log_op_start;
/// log_op_start!("load_routes");
/// log_op_start!("bootstrap_module", module = "catalog");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = shopfront_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = shopfront_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use shopfront_core::log_op_end;
/// log_op_end!("load_routes", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = shopfront_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = shopfront_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into `SfError` (including `KernelError`).
///
/// # Example
///
/// ```
/// # use shopfront_core::{log_op_error, errors::KernelError};
/// let err = KernelError::DuplicateModule { module: "catalog".to_string() };
/// log_op_error!("load_modules", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let sf_err: $crate::errors::SfError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = shopfront_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?sf_err.kind(),
            err.code = sf_err.code(),
            error = %sf_err,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let sf_err: $crate::errors::SfError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = shopfront_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?sf_err.kind(),
            err.code = sf_err.code(),
            error = %sf_err,
            $($field)*
        );
    }};
}
