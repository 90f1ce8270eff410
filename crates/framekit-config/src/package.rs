//! Package implementations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use framekit_core::config::plugin::PackageConfig;
use framekit_core::traits::{Package, PackageRegistry, PartitionSource};
use framekit_core::types::{CanonicalMap, Value};

use crate::loader::FileLoader;

/// A package whose partitions are held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPackage {
    name: String,
    partitions: HashMap<String, CanonicalMap>,
}

impl StaticPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partitions: HashMap::new(),
        }
    }

    /// Adds (or replaces) a partition.
    pub fn with_partition(mut self, partition: impl Into<String>, config: CanonicalMap) -> Self {
        self.partitions.insert(partition.into(), config);
        self
    }
}

impl Package for StaticPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self, partition: &str) -> CanonicalMap {
        self.partitions.get(partition).cloned().unwrap_or_default()
    }
}

/// A package reading partition files from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryPackage {
    name: String,
    loader: FileLoader,
}

impl DirectoryPackage {
    pub fn new(name: impl Into<String>, loader: FileLoader) -> Self {
        Self {
            name: name.into(),
            loader,
        }
    }
}

impl Package for DirectoryPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self, partition: &str) -> CanonicalMap {
        match self.loader.load_partition(partition) {
            Ok(Some(Value::Map(map))) => map,
            Ok(_) => CanonicalMap::new(),
            Err(e) => {
                warn!(package = %self.name, partition, error = %e, "Failed to load package partition");
                CanonicalMap::new()
            }
        }
    }
}

/// Packages in registration order.
#[derive(Debug, Clone, Default)]
pub struct PackageList {
    packages: Vec<Arc<dyn Package>>,
}

impl PackageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory packages for every configured package, in order.
    pub fn from_config(packages: &[PackageConfig]) -> Self {
        Self {
            packages: packages
                .iter()
                .map(|p| {
                    Arc::new(DirectoryPackage::new(&p.name, FileLoader::new(&p.configs_dir)))
                        as Arc<dyn Package>
                })
                .collect(),
        }
    }

    /// Appends a package; it takes precedence over every earlier one.
    pub fn with(mut self, package: impl Package + 'static) -> Self {
        self.packages.push(Arc::new(package));
        self
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageRegistry for PackageList {
    fn packages(&self) -> Vec<Arc<dyn Package>> {
        self.packages.clone()
    }
}
