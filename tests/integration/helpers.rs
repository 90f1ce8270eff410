//! Shared test helpers for integration tests.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use framekit_core::config::FrameworkConfig;
use framekit_core::config::plugin::PackageConfig;
use framekit_hooks::{AppContext, FilterBus, FilterRegistry};

/// A plugin installed in a temporary directory
pub struct TestApp {
    /// Keeps the directory alive
    pub dir: TempDir,
    /// Settings pointing into `dir`
    pub config: FrameworkConfig,
}

impl TestApp {
    /// Create a plugin named `shop` with no partition files
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = FrameworkConfig::default();
        config.plugin.name = "shop".to_string();
        config.plugin.configs_dir = dir.path().join("plugin").to_string_lossy().into_owned();
        std::fs::create_dir_all(&config.plugin.configs_dir).expect("plugin dir");
        Self { dir, config }
    }

    /// Write a partition file of the plugin
    pub fn plugin_file(&self, file: &str, contents: &str) -> &Self {
        write(Path::new(&self.config.plugin.configs_dir), file, contents);
        self
    }

    /// Register a package and write one of its partition files
    pub fn package_file(&mut self, package: &str, file: &str, contents: &str) -> &mut Self {
        let dir = self.dir.path().join(package);
        if !self.config.packages.iter().any(|p| p.name == package) {
            self.config.packages.push(PackageConfig {
                name: package.to_string(),
                configs_dir: dir.to_string_lossy().into_owned(),
            });
        }
        write(&dir, file, contents);
        self
    }

    /// Build the context, bus and initialized registry
    pub fn boot(&self) -> (Arc<AppContext>, Arc<FilterBus>, Arc<FilterRegistry>) {
        let context = Arc::new(AppContext::from_config(&self.config));
        let bus = Arc::new(FilterBus::new());
        let registry = FilterRegistry::new(context.clone(), bus.clone());
        registry.initialize();
        (context, bus, registry)
    }
}

fn write(dir: &Path, file: &str, contents: &str) {
    std::fs::create_dir_all(dir).expect("create dir");
    std::fs::write(dir.join(file), contents).expect("write partition");
}
