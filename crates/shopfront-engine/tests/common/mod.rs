//! Storefront project fixtures on a temporary directory

use std::fs;
use std::path::{Path, PathBuf};

use shopfront_store::{load_app_config, AppConfig, BuildDir};
use tempfile::TempDir;

pub struct Shop {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Shop {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` at `rel`, creating parents
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn remove(&self, rel: &str) {
        let path = self.root().join(rel);
        if path.is_dir() {
            fs::remove_dir_all(path).unwrap();
        } else {
            fs::remove_file(path).unwrap();
        }
    }

    /// Write `shopfront.yaml` and load it
    pub fn config(&self, content: &str) -> AppConfig {
        let path = self.write("shopfront.yaml", content);
        load_app_config(&path).unwrap()
    }

    pub fn build_dir(&self) -> BuildDir {
        BuildDir::new(self.root().join(".shopfront/build"))
    }

    /// Page route declaration with one component next to it
    pub fn page(&self, module: &str, id: &str, pattern: &str, component: &str) {
        self.write(
            &format!("{module}/routes/{id}/route.yaml"),
            &format!(
                "urlPattern: {pattern}\nmethod: GET\nhandlers: [{module}/{id}]\ncomponents:\n  - {{ path: {component}, areaId: content }}\n"
            ),
        );
        self.write(
            &format!("{module}/routes/{id}/{component}"),
            &format!("export default function {id}() {{}}\n"),
        );
    }
}
