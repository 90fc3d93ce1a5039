//! Application config file (`shopfront.yaml`)
//!
//! ```yaml
//! modules:
//!   - { name: base, path: modules/base }
//! extensions:
//!   - { name: loyalty, path: extensions/loyalty, enabled: true, priority: 10 }
//! build:
//!   output_dir: .shopfront/build
//! settings:
//!   shop: { currency: USD }
//! ```
//!
//! Relative paths resolve against the directory holding the file. Unknown
//! keys are rejected.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use shopfront_core::{ModuleDescriptor, ModuleSet, SfError};

use crate::errors::{config_error, io_error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "shopfront.yaml";
pub const DEFAULT_BUILD_DIR: &str = ".shopfront/build";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleEntry {
    name: String,
    path: PathBuf,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtensionEntry {
    name: String,
    path: PathBuf,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    priority: i32,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BUILD_DIR)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildSection {
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AppConfigFile {
    modules: Vec<ModuleEntry>,
    #[serde(default)]
    extensions: Vec<ExtensionEntry>,
    #[serde(default)]
    build: BuildSection,
    #[serde(default)]
    settings: Value,
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory relative paths were resolved against
    pub base_dir: PathBuf,
    pub modules: ModuleSet,
    pub build_dir: PathBuf,
    /// Raw runtime settings; schema defaults are applied at startup
    pub settings: Value,
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load and resolve the config file at `path`
///
/// # Errors
///
/// Returns `NotFound`/`Io` if the file cannot be read, `InvalidConfig` for
/// malformed YAML or unknown keys, and the module errors of
/// [`ModuleSet::new`] for bad module lists.
pub fn load_app_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| io_error("load_app_config", path, e))?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    parse_app_config(&content, &base_dir).map_err(|e| {
        if e.path().is_none() {
            e.with_path(path.display().to_string())
        } else {
            e
        }
    })
}

/// Parse config `content` whose relative paths resolve against `base_dir`
///
/// # Errors
///
/// See [`load_app_config`].
pub fn parse_app_config(content: &str, base_dir: &Path) -> Result<AppConfig> {
    let file: AppConfigFile =
        serde_yaml::from_str(content).map_err(|e| config_error(base_dir, e.to_string()))?;

    if !(file.settings.is_null() || file.settings.is_object()) {
        return Err(config_error(base_dir, "'settings' must be a mapping"));
    }

    let core = file
        .modules
        .into_iter()
        .map(|m| ModuleDescriptor::core(m.name, resolve(base_dir, &m.path)))
        .collect();
    let extensions = file
        .extensions
        .into_iter()
        .map(|e| {
            ModuleDescriptor::extension(e.name, resolve(base_dir, &e.path), e.enabled, e.priority)
        })
        .collect();
    let modules = ModuleSet::new(core, extensions).map_err(SfError::from)?;

    Ok(AppConfig {
        base_dir: base_dir.to_path_buf(),
        modules,
        build_dir: resolve(base_dir, &file.build.output_dir),
        settings: file.settings,
    })
}
