//! Processor functions contributed to extension points.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::Result;

type ProcessorFn = dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// A transform over an extension point's accumulator
///
/// Processors are cheap to clone (shared function pointer). The same type is
/// used for the final processor of an extension point.
#[derive(Clone)]
pub struct Processor {
    f: Arc<ProcessorFn>,
}

impl Processor {
    /// Wrap a synchronous transform
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(move |value| {
                let out = f(value);
                Box::pin(async move { out })
            }),
        }
    }

    /// Wrap an asynchronous transform
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |value| Box::pin(f(value))),
        }
    }

    /// Apply this processor alone, outside any extension point
    pub fn call(&self, value: Value) -> BoxFuture<'static, Result<Value>> {
        (self.f)(value)
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Processor")
    }
}

/// A processor slotted at a priority
#[derive(Debug, Clone)]
pub(crate) struct RankedProcessor {
    pub(crate) priority: i32,
    pub(crate) processor: Processor,
}
