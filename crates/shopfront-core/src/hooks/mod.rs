//! Hook table: before/after/replace overrides on named functions
//!
//! Contributions for a function are kept in ascending priority order (ties
//! keep registration order). A composed function runs, in order:
//!
//! 1. every before hook, threading the arguments through each one
//! 2. the replace hook if one is registered, otherwise the original
//! 3. every after hook, threading the result through each one
//!
//! The chain of hooks for a name is assembled lazily on first request and
//! cached. A registration for that name drops its cached chain; after the
//! lock no registration can happen, so cached chains live for the rest of the
//! process.

mod hook;

pub use hook::{AfterHook, BeforeHook, BeforeOutcome, Callable, HookAction, HookArgs, HookKind};

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::errors::{KernelError, Result};
use crate::lock::LockController;

#[derive(Debug)]
struct RankedHook {
    priority: i32,
    action: HookAction,
}

/// Ordered contributions for one hooked function
#[derive(Debug, Default)]
struct HookEntry {
    contributions: Vec<RankedHook>,
}

impl HookEntry {
    fn has_replace(&self) -> bool {
        self.contributions
            .iter()
            .any(|h| h.action.kind() == HookKind::Replace)
    }

    fn chain(&self) -> HookChain {
        let mut chain = HookChain::default();
        for ranked in &self.contributions {
            match &ranked.action {
                HookAction::Before(h) => chain.before.push(h.clone()),
                HookAction::After(h) => chain.after.push(h.clone()),
                HookAction::Replace(c) => chain.replace = Some(c.clone()),
            }
        }
        chain
    }
}

#[derive(Default)]
struct HookChain {
    before: Vec<BeforeHook>,
    replace: Option<Callable>,
    after: Vec<AfterHook>,
}

/// Process-scoped hook table
pub struct HookTable {
    entries: HashMap<String, HookEntry>,
    cache: RwLock<HashMap<String, Arc<HookChain>>>,
    lock: LockController,
}

impl HookTable {
    /// Create an empty hook table bound to a lock controller
    pub fn new(lock: LockController) -> Self {
        Self {
            entries: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
            lock,
        }
    }

    /// Register a hook on `function_name`
    ///
    /// # Errors
    ///
    /// Returns `HooksLocked` once the lock transition has fired, and
    /// `DuplicateReplaceHook` for a second replace on the same function.
    pub fn add_hook(
        &mut self,
        function_name: &str,
        action: HookAction,
        priority: i32,
    ) -> Result<()> {
        if self.lock.is_locked() {
            tracing::error!(
                component = module_path!(),
                op = "add_hook",
                function_name = function_name,
                kind = %action.kind(),
                "hook registration attempted after lock"
            );
            return Err(KernelError::HooksLocked {
                function_name: function_name.to_string(),
            });
        }

        let entry = self.entries.entry(function_name.to_string()).or_default();
        if action.kind() == HookKind::Replace && entry.has_replace() {
            tracing::error!(
                component = module_path!(),
                op = "add_hook",
                function_name = function_name,
                "replace hook already registered"
            );
            return Err(KernelError::DuplicateReplaceHook {
                function_name: function_name.to_string(),
            });
        }

        let pos = entry
            .contributions
            .partition_point(|h| h.priority <= priority);
        entry
            .contributions
            .insert(pos, RankedHook { priority, action });

        self.cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(function_name);
        Ok(())
    }

    /// Compose the hooks registered for `function_name` around `original`
    pub fn get_composed_function(&self, function_name: &str, original: Callable) -> ComposedFunction {
        ComposedFunction {
            function_name: Arc::from(function_name),
            chain: self.chain_for(function_name),
            original,
        }
    }

    fn chain_for(&self, function_name: &str) -> Arc<HookChain> {
        if let Some(chain) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(function_name)
        {
            return chain.clone();
        }

        let chain = Arc::new(
            self.entries
                .get(function_name)
                .map(HookEntry::chain)
                .unwrap_or_default(),
        );
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(function_name.to_string())
            .or_insert(chain)
            .clone()
    }

    /// Number of hooks registered on `function_name`
    pub fn hook_count(&self, function_name: &str) -> usize {
        self.entries
            .get(function_name)
            .map_or(0, |e| e.contributions.len())
    }

    /// Names of all hooked functions, sorted
    pub fn hooked_functions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// The lock controller this table obeys
    pub fn lock_controller(&self) -> &LockController {
        &self.lock
    }
}

impl Default for HookTable {
    fn default() -> Self {
        Self::new(LockController::new())
    }
}

impl std::fmt::Debug for HookTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookTable")
            .field("functions", &self.hooked_functions())
            .field("phase", &self.lock.phase())
            .finish()
    }
}

/// A hooked function ready to call
///
/// Holds a snapshot of the chain taken when it was composed.
#[derive(Clone)]
pub struct ComposedFunction {
    function_name: Arc<str>,
    chain: Arc<HookChain>,
    original: Callable,
}

impl ComposedFunction {
    /// Name of the hooked function
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Run the composed chain with `args`
    ///
    /// # Errors
    ///
    /// Hook failures surface as `HookFailed`. Errors from the original
    /// function are returned unchanged.
    pub async fn call(&self, args: HookArgs) -> Result<Value> {
        let mut args = args;
        for hook in &self.chain.before {
            match hook
                .call(args)
                .await
                .map_err(|e| self.hook_failed(HookKind::Before, e))?
            {
                BeforeOutcome::Continue(next) => args = next,
                BeforeOutcome::Return(value) => return Ok(value),
            }
        }

        if self.chain.after.is_empty() {
            return self.call_target(args).await;
        }

        let mut result = self.call_target(args.clone()).await?;
        let args = Arc::new(args);
        for hook in &self.chain.after {
            result = hook
                .call(args.clone(), result)
                .await
                .map_err(|e| self.hook_failed(HookKind::After, e))?;
        }
        Ok(result)
    }

    async fn call_target(&self, args: HookArgs) -> Result<Value> {
        match &self.chain.replace {
            Some(replacement) => replacement
                .call(args)
                .await
                .map_err(|e| self.hook_failed(HookKind::Replace, e)),
            None => self.original.call(args).await,
        }
    }

    fn hook_failed(&self, kind: HookKind, err: KernelError) -> KernelError {
        tracing::error!(
            component = module_path!(),
            op = "call_composed",
            function_name = &*self.function_name,
            kind = %kind,
            error = %err,
            "hook failed"
        );
        KernelError::HookFailed {
            function_name: self.function_name.to_string(),
            kind: kind.to_string(),
            reason: err.to_string(),
        }
    }

    /// Turn the composed function back into a plain `Callable`
    pub fn into_callable(self) -> Callable {
        let composed = Arc::new(self);
        Callable::from_async(move |args| {
            let composed = composed.clone();
            async move { composed.call(args).await }
        })
    }
}

impl std::fmt::Debug for ComposedFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedFunction")
            .field("function_name", &self.function_name)
            .field("before", &self.chain.before.len())
            .field("replaced", &self.chain.replace.is_some())
            .field("after", &self.chain.after.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn original() -> Callable {
        Callable::new(|args| Ok(json!(format!("original({})", args.len()))))
    }

    #[tokio::test]
    async fn test_no_hooks_calls_original() {
        let table = HookTable::default();
        let f = table.get_composed_function("getPrice", original());
        assert_eq!(f.call(vec![json!(1)]).await.unwrap(), json!("original(1)"));
    }

    #[tokio::test]
    async fn test_before_rewrites_args_and_after_transforms_result() {
        let mut table = HookTable::default();
        table
            .add_hook(
                "sum",
                HookAction::Before(BeforeHook::new(|mut args| {
                    args.push(json!(10));
                    Ok(BeforeOutcome::Continue(args))
                })),
                0,
            )
            .unwrap();
        table
            .add_hook(
                "sum",
                HookAction::After(AfterHook::new(|args, result| {
                    let n = result.as_i64().unwrap_or_default();
                    Ok(json!(n * args.len() as i64))
                })),
                0,
            )
            .unwrap();

        let sum = Callable::new(|args| Ok(json!(args.iter().filter_map(Value::as_i64).sum::<i64>())));
        let f = table.get_composed_function("sum", sum);
        // before: [1, 2] -> [1, 2, 10]; original: 13; after: 13 * 3
        assert_eq!(f.call(vec![json!(1), json!(2)]).await.unwrap(), json!(39));
    }

    #[tokio::test]
    async fn test_replace_supersedes_original() {
        let mut table = HookTable::default();
        table
            .add_hook(
                "getPrice",
                HookAction::Replace(Callable::new(|_| Ok(json!("replaced")))),
                0,
            )
            .unwrap();
        let f = table.get_composed_function("getPrice", original());
        assert_eq!(f.call(vec![]).await.unwrap(), json!("replaced"));
    }

    #[test]
    fn test_second_replace_rejected() {
        let mut table = HookTable::default();
        table
            .add_hook("f", HookAction::Replace(original()), 0)
            .unwrap();
        let err = table
            .add_hook("f", HookAction::Replace(original()), 5)
            .unwrap_err();
        assert!(matches!(err, KernelError::DuplicateReplaceHook { .. }));
        assert_eq!(table.hook_count("f"), 1);
    }

    #[tokio::test]
    async fn test_before_short_circuit_skips_target_and_after() {
        let mut table = HookTable::default();
        table
            .add_hook(
                "f",
                HookAction::Before(BeforeHook::new(|_| Ok(BeforeOutcome::Return(json!("cached"))))),
                0,
            )
            .unwrap();
        table
            .add_hook(
                "f",
                HookAction::After(AfterHook::new(|_, _| Ok(json!("after ran")))),
                0,
            )
            .unwrap();
        let f = table.get_composed_function("f", original());
        assert_eq!(f.call(vec![]).await.unwrap(), json!("cached"));
    }

    #[tokio::test]
    async fn test_hooks_follow_priority_then_registration() {
        let mut table = HookTable::default();
        for (tag, priority) in [("b", 5), ("a", 0), ("c", 5)] {
            table
                .add_hook(
                    "f",
                    HookAction::After(AfterHook::new(move |_, result| {
                        Ok(json!(format!("{}{}", result.as_str().unwrap_or_default(), tag)))
                    })),
                    priority,
                )
                .unwrap();
        }
        let f = table.get_composed_function("f", Callable::new(|_| Ok(json!(""))));
        assert_eq!(f.call(vec![]).await.unwrap(), json!("abc"));
    }

    #[tokio::test]
    async fn test_registration_invalidates_cached_chain() {
        let mut table = HookTable::default();
        let before = table.get_composed_function("f", original());
        table
            .add_hook(
                "f",
                HookAction::Replace(Callable::new(|_| Ok(json!("new")))),
                0,
            )
            .unwrap();
        let after = table.get_composed_function("f", original());

        assert_eq!(before.call(vec![]).await.unwrap(), json!("original(0)"));
        assert_eq!(after.call(vec![]).await.unwrap(), json!("new"));
    }

    #[test]
    fn test_add_after_lock_fails() {
        let lock = LockController::new();
        let mut table = HookTable::new(lock.clone());
        lock.lock();
        let err = table
            .add_hook("anything", HookAction::Replace(original()), 0)
            .unwrap_err();
        assert_eq!(
            err,
            KernelError::HooksLocked {
                function_name: "anything".into()
            }
        );
    }

    #[tokio::test]
    async fn test_failing_after_hook_reports_kind() {
        let mut table = HookTable::default();
        table
            .add_hook(
                "f",
                HookAction::After(AfterHook::new(|_, _| {
                    Err(KernelError::Serialization {
                        message: "bad".into(),
                    })
                })),
                0,
            )
            .unwrap();
        let err = table
            .get_composed_function("f", original())
            .call(vec![])
            .await
            .unwrap_err();
        match err {
            KernelError::HookFailed { kind, .. } => assert_eq!(kind, "after"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
