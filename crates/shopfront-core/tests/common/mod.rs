//! Shared fixtures for kernel integration tests

use serde_json::{json, Value};
use shopfront_core::{
    BootstrapContext, ConfigSchema, HookTable, HttpMethod, LockController, ModuleDescriptor,
    Processor, Registry, RouteEntry,
};

/// Registry and hook table sharing one lock, as the loader wires them
#[allow(dead_code)]
pub struct Kernel {
    pub lock: LockController,
    pub registry: Registry,
    pub hooks: HookTable,
    pub schema: ConfigSchema,
    pub settings: Value,
}

#[allow(dead_code)]
impl Kernel {
    pub fn new() -> Self {
        let lock = LockController::new();
        Self {
            registry: Registry::new(lock.clone()),
            hooks: HookTable::new(lock.clone()),
            lock,
            schema: ConfigSchema::new(),
            settings: json!({}),
        }
    }

    /// Context for bootstrapping `module` against this kernel
    pub fn context<'a>(&'a mut self, module: &'a ModuleDescriptor) -> BootstrapContext<'a> {
        BootstrapContext::new(
            module,
            &mut self.registry,
            &mut self.hooks,
            &mut self.schema,
            &self.settings,
        )
    }
}

/// Processor appending `tag` to an array accumulator
#[allow(dead_code)]
pub fn append(tag: &'static str) -> Processor {
    Processor::new(move |mut acc| {
        if let Some(items) = acc.as_array_mut() {
            items.push(json!(tag));
        }
        Ok(acc)
    })
}

/// Page route with a handler chain
#[allow(dead_code)]
pub fn page_route(
    id: &str,
    method: HttpMethod,
    pattern: &str,
    module: &str,
    handlers: &[&str],
) -> RouteEntry {
    RouteEntry::new(id, method, pattern, module).with_handlers(handlers.iter().copied())
}
