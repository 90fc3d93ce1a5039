//! Bootstrap contract
//!
//! A module contributes to the extensibility kernel through a [`Bootstrap`]
//! implementation. The loader invokes each module's bootstrap in load order
//! with a [`BootstrapContext`] exposing the registry, the hook table, the
//! config schema and the (read-only) runtime settings.
//!
//! A bootstrap sees the contributions of every module loaded before it, plus
//! its own so far. Load order is deterministic, so this view is stable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config_schema::ConfigSchema;
use crate::errors::Result;
use crate::hooks::{Callable, ComposedFunction, HookAction, HookTable};
use crate::module::ModuleDescriptor;
use crate::registry::{Processor, Registry};

/// Capabilities handed to one module's bootstrap
pub struct BootstrapContext<'a> {
    module: &'a ModuleDescriptor,
    registry: &'a mut Registry,
    hooks: &'a mut HookTable,
    schema: &'a mut ConfigSchema,
    settings: &'a Value,
}

impl<'a> BootstrapContext<'a> {
    pub fn new(
        module: &'a ModuleDescriptor,
        registry: &'a mut Registry,
        hooks: &'a mut HookTable,
        schema: &'a mut ConfigSchema,
        settings: &'a Value,
    ) -> Self {
        Self {
            module,
            registry,
            hooks,
            schema,
            settings,
        }
    }

    /// The module being bootstrapped
    pub fn module(&self) -> &ModuleDescriptor {
        self.module
    }

    pub fn registry(&mut self) -> &mut Registry {
        self.registry
    }

    pub fn hooks(&mut self) -> &mut HookTable {
        self.hooks
    }

    /// Raw runtime settings, before schema defaults are applied
    pub fn settings(&self) -> &Value {
        self.settings
    }

    pub fn add_processor(
        &mut self,
        extension_point: &str,
        processor: Processor,
        priority: i32,
    ) -> Result<()> {
        self.registry
            .add_processor(extension_point, processor, priority)
    }

    pub fn add_final_processor(&mut self, extension_point: &str, processor: Processor) -> Result<()> {
        self.registry.add_final_processor(extension_point, processor)
    }

    pub fn add_hook(&mut self, function_name: &str, action: HookAction, priority: i32) -> Result<()> {
        self.hooks.add_hook(function_name, action, priority)
    }

    /// Fold an extension point with the contributions registered so far
    pub async fn run_processors(&self, extension_point: &str, initial: Value) -> Result<Value> {
        self.registry.run_processors(extension_point, initial).await
    }

    pub fn get_composed_function(&self, function_name: &str, original: Callable) -> ComposedFunction {
        self.hooks.get_composed_function(function_name, original)
    }

    /// Deep-merge a partial schema into the application config schema
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfigSchema` when the merged document is malformed.
    pub fn merge_config_schema(&mut self, partial: Value) -> Result<()> {
        self.schema.merge(partial)
    }
}

/// A module's compiled-in bootstrap contribution
#[async_trait]
pub trait Bootstrap: Send + Sync {
    /// Register processors, hooks and schema fragments
    ///
    /// Any error aborts startup.
    async fn bootstrap(&self, ctx: &mut BootstrapContext<'_>) -> Result<()>;
}

/// Bootstrap backed by a synchronous closure
pub struct FnBootstrap<F> {
    f: F,
}

impl<F> FnBootstrap<F>
where
    F: Fn(&mut BootstrapContext<'_>) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Bootstrap for FnBootstrap<F>
where
    F: Fn(&mut BootstrapContext<'_>) -> Result<()> + Send + Sync,
{
    async fn bootstrap(&self, ctx: &mut BootstrapContext<'_>) -> Result<()> {
        (self.f)(ctx)
    }
}

/// Compiled-in bootstraps keyed by module name
///
/// A module without an entry contributes nothing.
#[derive(Clone, Default)]
pub struct BootstrapCatalog {
    entries: HashMap<String, Arc<dyn Bootstrap>>,
}

impl BootstrapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bootstrap` for `module`, replacing any previous one
    pub fn register(&mut self, module: impl Into<String>, bootstrap: impl Bootstrap + 'static) {
        self.entries.insert(module.into(), Arc::new(bootstrap));
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, module: impl Into<String>, bootstrap: impl Bootstrap + 'static) -> Self {
        self.register(module, bootstrap);
        self
    }

    pub fn get(&self, module: &str) -> Option<Arc<dyn Bootstrap>> {
        self.entries.get(module).cloned()
    }

    pub fn contains(&self, module: &str) -> bool {
        self.entries.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for BootstrapCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("BootstrapCatalog")
            .field("modules", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::KernelError;
    use crate::lock::LockController;
    use serde_json::json;

    #[tokio::test]
    async fn test_context_sees_own_registrations() {
        let module = ModuleDescriptor::core("base", "/m/base");
        let lock = LockController::new();
        let mut registry = Registry::new(lock.clone());
        let mut hooks = HookTable::new(lock);
        let mut schema = ConfigSchema::new();
        let settings = json!({});

        let bootstrap = FnBootstrap::new(|ctx: &mut BootstrapContext<'_>| {
            ctx.add_processor("fields", Processor::new(|_| Ok(json!(["sku"]))), 0)?;
            ctx.merge_config_schema(json!({ "properties": { "shop": { "type": "object" } } }))
        });

        let mut ctx =
            BootstrapContext::new(&module, &mut registry, &mut hooks, &mut schema, &settings);
        bootstrap.bootstrap(&mut ctx).await.unwrap();
        let seen = ctx.run_processors("fields", json!([])).await.unwrap();

        assert_eq!(seen, json!(["sku"]));
        assert_eq!(ctx.module().name, "base");
        assert!(schema.document()["properties"]["shop"].is_object());
    }

    #[tokio::test]
    async fn test_bootstrap_error_propagates() {
        let module = ModuleDescriptor::core("base", "/m/base");
        let mut registry = Registry::default();
        let mut hooks = HookTable::default();
        let mut schema = ConfigSchema::new();
        let settings = Value::Null;

        let bootstrap = FnBootstrap::new(|ctx: &mut BootstrapContext<'_>| {
            ctx.merge_config_schema(json!("not a schema"))
        });
        let mut ctx =
            BootstrapContext::new(&module, &mut registry, &mut hooks, &mut schema, &settings);
        let err = bootstrap.bootstrap(&mut ctx).await.unwrap_err();
        assert!(matches!(err, KernelError::InvalidConfigSchema { .. }));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = BootstrapCatalog::new()
            .with("base", FnBootstrap::new(|_: &mut BootstrapContext<'_>| Ok(())));
        assert!(catalog.contains("base"));
        assert!(catalog.get("missing").is_none());
        assert_eq!(catalog.len(), 1);
    }
}
