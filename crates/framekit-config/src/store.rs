//! Layered, cached configuration partitions.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::{DashMap, DashSet};
use tracing::{debug, warn};

use framekit_core::config::FrameworkConfig;
use framekit_core::traits::{PackageRegistry, PartitionSource};
use framekit_core::types::{CanonicalMap, Fallback, KeyPath, Value};
use framekit_data::PathResolver;

use crate::loader::FileLoader;
use crate::merge::{ROOT_PARTITION, VersionFloors, replace_recursive};
use crate::package::PackageList;

/// Loads partitions by merging every package's contribution with the
/// plugin's own file, then caches them for the lifetime of the store.
///
/// Later packages override earlier ones and the plugin overrides every
/// package. [`set`](Self::set) edits only the cached copy.
#[derive(Debug)]
pub struct ConfigStore {
    packages: Arc<dyn PackageRegistry>,
    source: Arc<dyn PartitionSource>,
    resolver: PathResolver,
    default_floors: VersionFloors,
    partitions: DashMap<String, Arc<CanonicalMap>>,
    loading: DashSet<(String, ThreadId)>,
}

/// Clears a loading marker when the merge finishes or unwinds.
struct LoadingGuard<'a> {
    loading: &'a DashSet<(String, ThreadId)>,
    marker: (String, ThreadId),
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.loading.remove(&self.marker);
    }
}

impl ConfigStore {
    /// Creates a store over the given package registry and plugin source.
    pub fn new(
        packages: Arc<dyn PackageRegistry>,
        source: Arc<dyn PartitionSource>,
        default_floors: VersionFloors,
    ) -> Self {
        Self {
            packages,
            source,
            resolver: PathResolver::new(),
            default_floors,
            partitions: DashMap::new(),
            loading: DashSet::new(),
        }
    }

    /// Creates a store reading the plugin's and the packages' partition files
    /// from the directories named in the settings.
    pub fn from_config(config: &FrameworkConfig) -> Self {
        Self::new(
            Arc::new(PackageList::from_config(&config.packages)),
            Arc::new(FileLoader::new(&config.plugin.configs_dir)),
            VersionFloors::from_config(&config.versions),
        )
    }

    /// Returns the merged partition, merging it on first use.
    ///
    /// A re-entrant load of a partition this thread is still merging returns
    /// an empty partition without caching it.
    pub fn load(&self, name: &str) -> Arc<CanonicalMap> {
        if let Some(cached) = self.partitions.get(name) {
            return Arc::clone(cached.value());
        }

        let marker = (name.to_string(), thread::current().id());
        if !self.loading.insert(marker.clone()) {
            warn!(partition = name, "Partition requested while it is being merged");
            return Arc::new(CanonicalMap::new());
        }
        let guard = LoadingGuard {
            loading: &self.loading,
            marker,
        };

        let merged = Arc::new(self.merge(name));
        drop(guard);

        let entry = self.partitions.entry(name.to_string()).or_insert(merged);
        Arc::clone(entry.value())
    }

    /// Resolves `key` in the partition, or `default` on a miss.
    /// `KeyPath::Whole` returns the whole partition as a map.
    pub fn get<'a>(&self, name: &str, key: impl Into<KeyPath>, default: impl Into<Fallback<'a>>) -> Value {
        let partition = self.load(name);
        self.resolver.get(&*partition, key, default)
    }

    /// Overrides `key` in the cached partition. Source files are untouched.
    pub fn set(&self, name: &str, key: impl Into<KeyPath>, value: impl Into<Value>) {
        self.load(name);
        let mut entry = self.partitions.entry(name.to_string()).or_default();
        let updated = self.resolver.set(&**entry, key, value);
        *entry = Arc::new(updated);
        debug!(partition = name, "Configuration override applied");
    }

    /// Whether the partition has been merged and cached.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.partitions.contains_key(name)
    }

    /// Names of every cached partition, sorted.
    pub fn loaded_partitions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.partitions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// The version floors stored in the root partition.
    pub fn required_versions(&self) -> VersionFloors {
        self.default_floors.read(&self.load(ROOT_PARTITION))
    }

    fn plugin_partition(&self, name: &str) -> CanonicalMap {
        match self.source.load_partition(name) {
            Ok(Some(Value::Map(map))) => map,
            Ok(Some(other)) => {
                warn!(partition = name, kind = other.type_name(), "Partition is not a map, ignoring");
                CanonicalMap::new()
            }
            Ok(None) => CanonicalMap::new(),
            Err(e) => {
                warn!(partition = name, error = %e, "Failed to load plugin partition");
                CanonicalMap::new()
            }
        }
    }

    fn merge(&self, name: &str) -> CanonicalMap {
        let plugin = self.plugin_partition(name);
        let packages = self.packages.packages();
        let mut merged = CanonicalMap::new();

        if name == ROOT_PARTITION {
            let mut floors = self.default_floors.read(&plugin);
            for package in &packages {
                let contribution = package.config(name);
                floors.raise(&contribution);
                replace_recursive(&mut merged, contribution);
            }
            replace_recursive(&mut merged, plugin);
            floors.write_into(&mut merged);
        } else {
            for package in &packages {
                replace_recursive(&mut merged, package.config(name));
            }
            replace_recursive(&mut merged, plugin);
        }

        debug!(
            partition = name,
            packages = packages.len(),
            entries = merged.len(),
            "Configuration partition merged"
        );
        merged
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use framekit_core::AppResult;
    use framekit_core::canonical;
    use framekit_core::traits::Package;
    use framekit_core::types::Key;

    use super::*;
    use crate::merge::{PLATFORM_FLOOR_KEY, RUNTIME_FLOOR_KEY};
    use crate::package::StaticPackage;

    /// Plugin partitions held in memory, counting reads.
    #[derive(Debug, Default)]
    struct MemorySource {
        partitions: Mutex<Vec<(String, Value)>>,
        reads: AtomicUsize,
    }

    impl MemorySource {
        fn with(self, name: &str, value: impl Into<Value>) -> Self {
            self.partitions
                .lock()
                .unwrap()
                .push((name.to_string(), value.into()));
            self
        }
    }

    impl PartitionSource for MemorySource {
        fn load_partition(&self, name: &str) -> AppResult<Option<Value>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .partitions
                .lock()
                .unwrap()
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()))
        }
    }

    fn store(packages: PackageList, source: MemorySource) -> (ConfigStore, Arc<MemorySource>) {
        let source = Arc::new(source);
        let store = ConfigStore::new(
            Arc::new(packages),
            source.clone(),
            VersionFloors::new("5.6", "3.9"),
        );
        (store, source)
    }

    #[test]
    fn test_merge_precedence() {
        let packages = PackageList::new()
            .with(StaticPackage::new("a").with_partition("p", canonical! { "x" => 1, "y" => 2 }))
            .with(StaticPackage::new("b").with_partition("p", canonical! { "y" => 20, "z" => 3 }));
        let (store, _) = store(packages, MemorySource::default().with("p", canonical! { "z" => 30 }));

        let partition = store.load("p");
        assert_eq!(*partition, canonical! { "x" => 1, "y" => 20, "z" => 30 });
        let keys: Vec<_> = partition.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("x"), Key::from("y"), Key::from("z")]);
    }

    #[test]
    fn test_plugin_only_and_package_only_keys() {
        let packages = PackageList::new().with(
            StaticPackage::new("core").with_partition("test_config", canonical! { "test1" => "test1", "test2" => "test2" }),
        );
        let source = MemorySource::default().with("test_config", canonical! { "test2" => "test3", "test4" => "test4" });
        let (store, _) = store(packages, source);

        assert_eq!(store.get("test_config", "test1", ()), Value::from("test1"));
        assert_eq!(store.get("test_config", "test2", ()), Value::from("test3"));
        assert_eq!(store.get("test_config", "test4", ()), Value::from("test4"));
        assert!(store.get("test_config", "test5", ()).is_empty());
        assert_eq!(store.get("test_config", "test5", "test6"), Value::from("test6"));
    }

    #[test]
    fn test_cache_is_stable() {
        let (store, source) = store(PackageList::new(), MemorySource::default().with("p", canonical! { "a" => 1 }));

        let first = store.load("p");
        let second = store.load("p");
        assert_eq!(first, second);
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert!(store.is_loaded("p"));
        assert_eq!(store.loaded_partitions(), vec!["p".to_string()]);
    }

    #[test]
    fn test_set_overrides_cache_only() {
        let (store, source) = store(PackageList::new(), MemorySource::default().with("p", canonical! { "a" => 1 }));

        store.set("p", "b.c", "override");
        assert_eq!(store.get("p", "b.c", ()), Value::from("override"));
        assert_eq!(store.get("p", "a", ()), Value::from(1));

        let raw = source.load_partition("p").unwrap().unwrap();
        assert_eq!(raw, Value::Map(canonical! { "a" => 1 }));
    }

    #[test]
    fn test_missing_and_non_map_partitions_are_empty() {
        let (store, _) = store(PackageList::new(), MemorySource::default().with("scalar", "text"));
        assert!(store.load("absent").is_empty());
        assert!(store.load("scalar").is_empty());
        assert_eq!(store.get("absent", KeyPath::Whole, ()), Value::Map(CanonicalMap::new()));
    }

    #[test]
    fn test_root_partition_version_floors() {
        let packages = PackageList::new()
            .with(StaticPackage::new("a").with_partition(
                ROOT_PARTITION,
                canonical! { RUNTIME_FLOOR_KEY => "7.4", PLATFORM_FLOOR_KEY => "4.0", "name" => "a" },
            ))
            .with(StaticPackage::new("b").with_partition(
                ROOT_PARTITION,
                canonical! { RUNTIME_FLOOR_KEY => "7.0", PLATFORM_FLOOR_KEY => "5.2" },
            ));
        // the plugin declares a lower runtime floor; packages may only raise it
        let source = MemorySource::default().with(
            ROOT_PARTITION,
            canonical! { RUNTIME_FLOOR_KEY => "7.2", "name" => "plugin" },
        );
        let (store, _) = store(packages, source);

        assert_eq!(store.required_versions(), VersionFloors::new("7.4", "5.2"));
        assert_eq!(store.get(ROOT_PARTITION, "name", ()), Value::from("plugin"));
        assert_eq!(store.get(ROOT_PARTITION, RUNTIME_FLOOR_KEY, ()), Value::from("7.4"));
    }

    #[test]
    fn test_root_partition_defaults() {
        let (store, _) = store(PackageList::new(), MemorySource::default());
        assert_eq!(store.required_versions(), VersionFloors::new("5.6", "3.9"));
    }

    /// A package that loads the partition it is contributing to.
    #[derive(Debug)]
    struct Recursive {
        store: Mutex<Option<Arc<ConfigStore>>>,
    }

    impl Package for Recursive {
        fn name(&self) -> &str {
            "recursive"
        }

        fn config(&self, partition: &str) -> CanonicalMap {
            let store = self.store.lock().unwrap().clone();
            match store {
                Some(store) => {
                    let nested = store.load(partition);
                    canonical! { "nested_len" => nested.len() }
                }
                None => CanonicalMap::new(),
            }
        }
    }

    #[derive(Debug)]
    struct Shared(Arc<Recursive>);

    impl Package for Shared {
        fn name(&self) -> &str {
            self.0.name()
        }

        fn config(&self, partition: &str) -> CanonicalMap {
            self.0.config(partition)
        }
    }

    #[test]
    fn test_reentrant_load_returns_empty() {
        let recursive = Arc::new(Recursive {
            store: Mutex::new(None),
        });
        let store = Arc::new(ConfigStore::new(
            Arc::new(PackageList::new().with(Shared(recursive.clone()))),
            Arc::new(MemorySource::default()),
            VersionFloors::new("5.6", "3.9"),
        ));
        *recursive.store.lock().unwrap() = Some(store.clone());

        let partition = store.load("p");
        assert_eq!(partition.get(&Key::from("nested_len")), Some(&Value::from(0)));
        // break the cycle
        *recursive.store.lock().unwrap() = None;
    }
}
