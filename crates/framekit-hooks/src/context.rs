//! Application context, the root object filter targets are resolved from.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tracing::{debug, info};

use framekit_config::ConfigStore;
use framekit_core::AppResult;
use framekit_core::config::FrameworkConfig;
use framekit_core::traits::FilterTarget;
use framekit_core::types::{Slug, Value};
use framekit_data::{Collection, PathResolver};

use crate::system::System;

/// Getter for a named context property.
pub type PropertyAccessor = Arc<dyn Fn(&AppContext) -> Option<Arc<dyn FilterTarget>> + Send + Sync>;

/// Builds the shared instance of a singleton-capable receiver.
pub type SingletonFactory = Arc<dyn Fn(&AppContext) -> AppResult<Arc<dyn FilterTarget>> + Send + Sync>;

/// Name of the built-in property exposing [`System`].
pub const SYSTEM_PROPERTY: &str = "system";

/// Process-wide shared receivers, created on first use.
#[derive(Default)]
pub struct SingletonRegistry {
    factories: DashMap<String, SingletonFactory>,
    instances: DashMap<String, Arc<dyn FilterTarget>>,
}

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` as resolvable through `factory`.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&AppContext) -> AppResult<Arc<dyn FilterTarget>> + Send + Sync + 'static,
    {
        let name = name.into();
        self.instances.remove(&name);
        debug!(singleton = %name, "Singleton registered");
        self.factories.insert(name, Arc::new(factory));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Whether the shared instance of `name` has been created.
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    /// The shared instance of `name`, creating it if needed.
    /// Returns `Ok(None)` when nothing is registered under `name`.
    pub fn resolve(&self, name: &str, context: &AppContext) -> AppResult<Option<Arc<dyn FilterTarget>>> {
        if let Some(instance) = self.instances.get(name) {
            return Ok(Some(Arc::clone(instance.value())));
        }

        // Clone out so the factory runs without holding a shard lock
        let Some(factory) = self.factories.get(name).map(|f| Arc::clone(f.value())) else {
            return Ok(None);
        };

        let instance = factory(context)?;
        let entry = self.instances.entry(name.to_string()).or_insert(instance);
        debug!(singleton = %name, "Singleton instantiated");
        Ok(Some(Arc::clone(entry.value())))
    }
}

impl fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        f.debug_struct("SingletonRegistry")
            .field("factories", &names)
            .field("instances", &self.instances.len())
            .finish()
    }
}

/// Context shared by every framekit component of one plugin.
pub struct AppContext {
    slug: Slug,
    resolver: PathResolver,
    config: Arc<ConfigStore>,
    system: Arc<System>,
    uninstalling: AtomicBool,
    properties: DashMap<String, PropertyAccessor>,
    singletons: SingletonRegistry,
}

impl AppContext {
    pub fn new(slug: Slug, config: Arc<ConfigStore>, system: System) -> Self {
        let context = Self {
            slug,
            resolver: PathResolver::new(),
            config,
            system: Arc::new(system),
            uninstalling: AtomicBool::new(false),
            properties: DashMap::new(),
            singletons: SingletonRegistry::new(),
        };
        context.register_property(SYSTEM_PROPERTY, |ctx: &AppContext| {
            Some(Arc::clone(&ctx.system) as Arc<dyn FilterTarget>)
        });
        context
    }

    /// Builds the context, config store and version info from settings.
    pub fn from_config(config: &FrameworkConfig) -> Self {
        let slug = Slug::new(&config.plugin.name).with_framework_prefix(&config.plugin.framework_prefix);
        let store = Arc::new(ConfigStore::from_config(config));
        let system = System::detect(&store, &config.versions);

        info!(plugin = %slug, "Application context created");
        Self::new(slug, store, system)
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    /// Wraps `items` in a [`Collection`].
    pub fn collect(&self, items: &Value) -> Collection {
        Collection::from_value(items)
    }

    /// Whether the plugin is being uninstalled. Version gates are lifted
    /// while uninstalling so cleanup filters still run.
    pub fn is_uninstalling(&self) -> bool {
        self.uninstalling.load(Ordering::Acquire)
    }

    pub fn set_uninstalling(&self, uninstalling: bool) {
        self.uninstalling.store(uninstalling, Ordering::Release);
    }

    /// Exposes a named property for target resolution.
    pub fn register_property<F>(&self, name: impl Into<String>, accessor: F)
    where
        F: Fn(&AppContext) -> Option<Arc<dyn FilterTarget>> + Send + Sync + 'static,
    {
        self.properties.insert(name.into(), Arc::new(accessor));
    }

    /// Exposes an existing receiver as a named property.
    pub fn register_target(&self, name: impl Into<String>, target: Arc<dyn FilterTarget>) {
        self.register_property(name, move |_: &AppContext| Some(Arc::clone(&target)));
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Reads a named property.
    pub fn property(&self, name: &str) -> Option<Arc<dyn FilterTarget>> {
        let accessor = self.properties.get(name).map(|a| Arc::clone(a.value()))?;
        accessor(self)
    }

    pub fn singletons(&self) -> &SingletonRegistry {
        &self.singletons
    }

    /// Declares a singleton-capable receiver.
    pub fn register_singleton<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&AppContext) -> AppResult<Arc<dyn FilterTarget>> + Send + Sync + 'static,
    {
        self.singletons.register(name, factory);
    }

    /// The shared instance of a singleton-capable receiver.
    pub fn singleton(&self, name: &str) -> AppResult<Option<Arc<dyn FilterTarget>>> {
        self.singletons.resolve(name, self)
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut properties: Vec<String> = self.properties.iter().map(|e| e.key().clone()).collect();
        properties.sort();
        f.debug_struct("AppContext")
            .field("slug", &self.slug)
            .field("system", &self.system)
            .field("uninstalling", &self.is_uninstalling())
            .field("properties", &properties)
            .field("singletons", &self.singletons)
            .finish_non_exhaustive()
    }
}
