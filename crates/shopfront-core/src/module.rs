//! Module descriptors and the load-ordered module set.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{KernelError, Result};

/// Whether a module ships with the platform or is an installed extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Core,
    Extension,
}

/// One core module or extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub root: PathBuf,
    pub kind: ModuleKind,
    /// Always true for core modules
    pub enabled: bool,
    /// Load priority among extensions (ascending)
    pub priority: i32,
}

impl ModuleDescriptor {
    pub fn core(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            kind: ModuleKind::Core,
            enabled: true,
            priority: 0,
        }
    }

    pub fn extension(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        enabled: bool,
        priority: i32,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            kind: ModuleKind::Extension,
            enabled,
            priority,
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| KernelError::InvalidModuleDescriptor {
            module: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid(
                "name may only contain ASCII letters, digits, '-' and '_'",
            ));
        }
        if self.root.as_os_str().is_empty() {
            return Err(invalid("root path must not be empty"));
        }
        Ok(())
    }
}

/// Core modules followed by enabled extensions, in load order
///
/// Core modules keep their declared order. Disabled extensions are dropped;
/// the rest are stably sorted by ascending priority so equal priorities keep
/// their configured order.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleSet {
    /// Build the load order
    ///
    /// # Errors
    ///
    /// Returns `InvalidModuleDescriptor` for a malformed descriptor (including
    /// a core module listed as an extension or vice versa) and
    /// `DuplicateModule` when two descriptors share a name.
    pub fn new(core: Vec<ModuleDescriptor>, extensions: Vec<ModuleDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for module in core.iter().chain(extensions.iter()) {
            module.validate()?;
            if !seen.insert(module.name.clone()) {
                return Err(KernelError::DuplicateModule {
                    module: module.name.clone(),
                });
            }
        }
        if let Some(m) = core.iter().find(|m| m.kind != ModuleKind::Core) {
            return Err(KernelError::InvalidModuleDescriptor {
                module: m.name.clone(),
                reason: "listed as a core module but tagged as an extension".into(),
            });
        }
        if let Some(m) = extensions.iter().find(|m| m.kind != ModuleKind::Extension) {
            return Err(KernelError::InvalidModuleDescriptor {
                module: m.name.clone(),
                reason: "listed as an extension but tagged as a core module".into(),
            });
        }

        let mut enabled: Vec<ModuleDescriptor> =
            extensions.into_iter().filter(|m| m.enabled).collect();
        enabled.sort_by_key(|m| m.priority);

        let mut modules = core;
        modules.extend(enabled);
        Ok(Self { modules })
    }

    /// Modules in load order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Module names in load order
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }
}
