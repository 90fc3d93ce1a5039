//! Hook contribution types.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::Result;

/// Positional call arguments of a hookable function
pub type HookArgs = Vec<Value>;

type CallableFn = dyn Fn(HookArgs) -> BoxFuture<'static, Result<Value>> + Send + Sync;
type BeforeFn = dyn Fn(HookArgs) -> BoxFuture<'static, Result<BeforeOutcome>> + Send + Sync;
type AfterFn = dyn Fn(Arc<HookArgs>, Value) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// A hookable function body: the wrapped function or a replacement
#[derive(Clone)]
pub struct Callable {
    f: Arc<CallableFn>,
}

impl Callable {
    /// Wrap a synchronous function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(HookArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(move |args| {
                let out = f(args);
                Box::pin(async move { out })
            }),
        }
    }

    /// Wrap an asynchronous function
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |args| Box::pin(f(args))),
        }
    }

    /// Invoke with `args`
    pub fn call(&self, args: HookArgs) -> BoxFuture<'static, Result<Value>> {
        (self.f)(args)
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callable")
    }
}

/// What a before hook decided
#[derive(Debug, Clone, PartialEq)]
pub enum BeforeOutcome {
    /// Carry on with these (possibly rewritten) arguments
    Continue(HookArgs),
    /// Return this value immediately; later before hooks, the target and
    /// the after hooks are skipped
    Return(Value),
}

/// Runs ahead of the target and may rewrite arguments or short-circuit
#[derive(Clone)]
pub struct BeforeHook {
    f: Arc<BeforeFn>,
}

impl BeforeHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(HookArgs) -> Result<BeforeOutcome> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(move |args| {
                let out = f(args);
                Box::pin(async move { out })
            }),
        }
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BeforeOutcome>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |args| Box::pin(f(args))),
        }
    }

    pub(crate) fn call(&self, args: HookArgs) -> BoxFuture<'static, Result<BeforeOutcome>> {
        (self.f)(args)
    }
}

/// Runs after the target and may transform its result
#[derive(Clone)]
pub struct AfterHook {
    f: Arc<AfterFn>,
}

impl AfterHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&HookArgs, Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(move |args, result| {
                let out = f(&args, result);
                Box::pin(async move { out })
            }),
        }
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<HookArgs>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |args, result| Box::pin(f(args, result))),
        }
    }

    pub(crate) fn call(
        &self,
        args: Arc<HookArgs>,
        result: Value,
    ) -> BoxFuture<'static, Result<Value>> {
        (self.f)(args, result)
    }
}

/// Hook kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Before,
    After,
    Replace,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookKind::Before => f.write_str("before"),
            HookKind::After => f.write_str("after"),
            HookKind::Replace => f.write_str("replace"),
        }
    }
}

/// One contribution to a hooked function
#[derive(Clone)]
pub enum HookAction {
    Before(BeforeHook),
    After(AfterHook),
    Replace(Callable),
}

impl HookAction {
    pub fn kind(&self) -> HookKind {
        match self {
            HookAction::Before(_) => HookKind::Before,
            HookAction::After(_) => HookKind::After,
            HookAction::Replace(_) => HookKind::Replace,
        }
    }
}

impl std::fmt::Debug for HookAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HookAction::{:?}", self.kind())
    }
}
