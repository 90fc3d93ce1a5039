//! Lock Controller
//!
//! One-shot `Unlocked → Locked` transition shared by the [`Registry`] and the
//! [`HookTable`]. The flag is published with release/acquire ordering so that
//! every read performed after `lock()` returns (on any thread) observes the
//! locked phase and the complete set of registrations made before it.
//!
//! [`Registry`]: crate::registry::Registry
//! [`HookTable`]: crate::hooks::HookTable

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Extensibility phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Bootstrap window: registrations accepted
    Mutable,
    /// Serving window: registry and hooks are read-only
    Locked,
}

/// Shared handle to the process-scoped lock flag
///
/// Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct LockController {
    locked: Arc<AtomicBool>,
}

impl LockController {
    /// Create a controller in the `Mutable` phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the lock transition
    ///
    /// Returns `true` if this call performed the transition and `false` if
    /// the controller was already locked (re-locking is a no-op).
    pub fn lock(&self) -> bool {
        let transitioned = self
            .locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if transitioned {
            tracing::info!(
                component = module_path!(),
                op = "lock",
                "extensibility locked"
            );
        }
        transitioned
    }

    /// Whether the lock transition has fired
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        if self.is_locked() {
            Phase::Locked
        } else {
            Phase::Mutable
        }
    }
}
