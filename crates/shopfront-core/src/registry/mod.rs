//! Extension-point registry
//!
//! Maps an extension-point name to an ordered list of processors plus at most
//! one final processor. `run_processors` folds the processors over an initial
//! value in ascending priority (ties keep registration order), then applies
//! the final processor exactly once.
//!
//! ## Phases
//!
//! Registration requires `&mut Registry` and is refused once the shared
//! [`LockController`] has fired. Reads take `&self`, so a locked registry is
//! shared as `Arc<Registry>` among concurrent readers without further
//! synchronisation.

mod processor;

pub use processor::Processor;

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::{KernelError, Result};
use crate::lock::LockController;
use processor::RankedProcessor;

/// A named slot where contributions are combined by ordered folding
#[derive(Debug, Default)]
struct ExtensionPoint {
    processors: Vec<RankedProcessor>,
    final_processor: Option<Processor>,
}

impl ExtensionPoint {
    fn insert(&mut self, processor: Processor, priority: i32) {
        // Upper bound keeps equal priorities in registration order
        let pos = self
            .processors
            .partition_point(|ranked| ranked.priority <= priority);
        self.processors.insert(
            pos,
            RankedProcessor {
                priority,
                processor,
            },
        );
    }
}

/// Process-scoped extension-point registry
#[derive(Debug)]
pub struct Registry {
    points: HashMap<String, ExtensionPoint>,
    lock: LockController,
}

impl Registry {
    /// Create an empty registry bound to a lock controller
    pub fn new(lock: LockController) -> Self {
        Self {
            points: HashMap::new(),
            lock,
        }
    }

    fn ensure_unlocked(&self, op: &'static str, extension_point: &str) -> Result<()> {
        if self.lock.is_locked() {
            tracing::error!(
                component = module_path!(),
                op = op,
                extension_point = extension_point,
                "registration attempted after lock"
            );
            return Err(KernelError::RegistryLocked {
                extension_point: extension_point.to_string(),
            });
        }
        Ok(())
    }

    /// Register a processor at `extension_point`
    ///
    /// # Errors
    ///
    /// Returns `RegistryLocked` once the lock transition has fired.
    pub fn add_processor(
        &mut self,
        extension_point: &str,
        processor: Processor,
        priority: i32,
    ) -> Result<()> {
        self.ensure_unlocked("add_processor", extension_point)?;
        self.points
            .entry(extension_point.to_string())
            .or_default()
            .insert(processor, priority);
        tracing::debug!(
            component = module_path!(),
            extension_point = extension_point,
            priority = priority,
            "processor registered"
        );
        Ok(())
    }

    /// Register the final processor for `extension_point`
    ///
    /// # Errors
    ///
    /// Returns `RegistryLocked` once the lock transition has fired, and
    /// `DuplicateFinalProcessor` if the point already has one.
    pub fn add_final_processor(
        &mut self,
        extension_point: &str,
        processor: Processor,
    ) -> Result<()> {
        self.ensure_unlocked("add_final_processor", extension_point)?;
        let point = self.points.entry(extension_point.to_string()).or_default();
        if point.final_processor.is_some() {
            tracing::error!(
                component = module_path!(),
                op = "add_final_processor",
                extension_point = extension_point,
                "final processor already registered"
            );
            return Err(KernelError::DuplicateFinalProcessor {
                extension_point: extension_point.to_string(),
            });
        }
        point.final_processor = Some(processor);
        Ok(())
    }

    /// Fold the processors of `extension_point` over `initial`
    ///
    /// Processors run strictly one after another. An unknown extension point
    /// yields `initial` unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorFailed` (or `FinalProcessorFailed`) for the first
    /// contribution that fails; nothing after it runs.
    pub async fn run_processors(&self, extension_point: &str, initial: Value) -> Result<Value> {
        let Some(point) = self.points.get(extension_point) else {
            return Ok(initial);
        };

        let mut acc = initial;
        for (index, ranked) in point.processors.iter().enumerate() {
            acc = ranked.processor.call(acc).await.map_err(|err| {
                tracing::error!(
                    component = module_path!(),
                    op = "run_processors",
                    extension_point = extension_point,
                    index = index,
                    error = %err,
                    "processor failed"
                );
                KernelError::ProcessorFailed {
                    extension_point: extension_point.to_string(),
                    index,
                    reason: err.to_string(),
                }
            })?;
        }

        if let Some(final_processor) = &point.final_processor {
            acc = final_processor
                .call(acc)
                .await
                .map_err(|err| KernelError::FinalProcessorFailed {
                    extension_point: extension_point.to_string(),
                    reason: err.to_string(),
                })?;
        }

        Ok(acc)
    }

    /// Whether `extension_point` has a final processor
    pub fn has_final_processor(&self, extension_point: &str) -> bool {
        self.points
            .get(extension_point)
            .is_some_and(|p| p.final_processor.is_some())
    }

    /// Number of (non-final) processors at `extension_point`
    pub fn processor_count(&self, extension_point: &str) -> usize {
        self.points
            .get(extension_point)
            .map_or(0, |p| p.processors.len())
    }

    /// Names of all referenced extension points, sorted
    pub fn extension_points(&self) -> Vec<String> {
        let mut names: Vec<String> = self.points.keys().cloned().collect();
        names.sort();
        names
    }

    /// The lock controller this registry obeys
    pub fn lock_controller(&self) -> &LockController {
        &self.lock
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(LockController::new())
    }
}
