//! Grouped option store with per-group caching.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, info, warn};

use framekit_core::config::options::OptionsConfig;
use framekit_core::traits::{HookBus, OptionBackend, OptionScope};
use framekit_core::types::{CanonicalMap, Key, Slug, Value};
use framekit_data::PathResolver;

use crate::keys;

/// Persisted plugin options.
///
/// Each group is cached after its first read; every write reloads the group
/// from the backend first and drops the cache afterwards. Backend failures
/// are logged and surface as `false` or an empty group.
pub struct OptionStore {
    backend: Arc<dyn OptionBackend>,
    bus: Arc<dyn HookBus>,
    slug: Slug,
    resolver: PathResolver,
    multisite: bool,
    blog_id: AtomicU64,
    /// (scope, group) → cached group.
    groups: DashMap<(OptionScope, String), Arc<CanonicalMap>>,
    option_names: DashMap<String, String>,
    site_option_names: DashMap<String, String>,
}

impl OptionStore {
    pub fn new(backend: Arc<dyn OptionBackend>, bus: Arc<dyn HookBus>, slug: Slug, config: &OptionsConfig) -> Self {
        Self {
            backend,
            bus,
            slug,
            resolver: PathResolver::new(),
            multisite: config.multisite,
            blog_id: AtomicU64::new(config.blog_id),
            groups: DashMap::new(),
            option_names: DashMap::new(),
            site_option_names: DashMap::new(),
        }
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn is_multisite(&self) -> bool {
        self.multisite
    }

    /// The blog the store currently reads and writes.
    pub fn blog_id(&self) -> u64 {
        self.blog_id.load(Ordering::Acquire)
    }

    /// Moves the store to another blog, dropping every blog-scoped cache
    /// when the id changes.
    pub fn switch_blog(&self, blog_id: u64) {
        let previous = self.blog_id.swap(blog_id, Ordering::AcqRel);
        if previous == blog_id {
            return;
        }
        self.groups.retain(|(scope, _), _| *scope == OptionScope::Network);
        debug!(from = previous, to = blog_id, "Switched blog");
    }

    fn scope(&self, common: bool) -> OptionScope {
        if common && self.multisite {
            OptionScope::Network
        } else {
            OptionScope::Blog(self.blog_id())
        }
    }

    fn tag(&self, name: &str) -> String {
        self.slug.tag(name)
    }

    // ── Option names ───────────────────────────────────────

    /// The persisted name of a group in the blog scope.
    pub fn option_name(&self, group: Option<&str>) -> String {
        let group = keys::group_or_default(group);
        if let Some(cached) = self.option_names.get(group) {
            return cached.value().clone();
        }

        let name = if group == keys::DEFAULT_GROUP {
            self.bus.apply_filters(
                &self.tag(keys::GET_OPTION_NAME),
                vec![Value::from(keys::option_name(&self.slug))],
            )
        } else {
            self.bus.apply_filters(
                &self.tag(keys::GET_GROUP_OPTION_NAME),
                vec![Value::from(keys::group_option_name(&self.slug, group)), Value::from(group)],
            )
        };

        let entry = self.option_names.entry(group.to_string()).or_insert(name.to_string());
        entry.value().clone()
    }

    /// The persisted name of a group in the network scope.
    pub fn site_option_name(&self, group: Option<&str>) -> String {
        let group = keys::group_or_default(group);
        if let Some(cached) = self.site_option_names.get(group) {
            return cached.value().clone();
        }

        let name = if group == keys::DEFAULT_GROUP {
            self.bus.apply_filters(
                &self.tag(keys::GET_SITE_OPTION_NAME),
                vec![Value::from(keys::option_name(&self.slug))],
            )
        } else {
            self.bus.apply_filters(
                &self.tag(keys::GET_GROUP_SITE_OPTION_NAME),
                vec![Value::from(keys::group_option_name(&self.slug, group)), Value::from(group)],
            )
        };

        let entry = self.site_option_names.entry(group.to_string()).or_insert(name.to_string());
        entry.value().clone()
    }

    fn name_in(&self, scope: OptionScope, group: Option<&str>) -> String {
        match scope {
            OptionScope::Network => self.site_option_name(group),
            OptionScope::Blog(_) => self.option_name(group),
        }
    }

    /// Whether `option` is a name this store persists to.
    pub fn is_managed_option_name(&self, option: &str) -> bool {
        if option == self.option_name(None) {
            return true;
        }
        // Blog and network group names share one prefix
        option.starts_with(&keys::group_option_prefix(&self.slug))
    }

    // ── Group cache ────────────────────────────────────────

    async fn options(&self, group: Option<&str>, common: bool) -> Arc<CanonicalMap> {
        let scope = self.scope(common);
        let group = keys::group_or_default(group);
        let cache_key = (scope, group.to_string());
        if let Some(cached) = self.groups.get(&cache_key) {
            return Arc::clone(cached.value());
        }

        let name = self.name_in(scope, Some(group));
        match self.backend.get(scope, &name).await {
            Ok(stored) => {
                let loaded = Arc::new(stored.unwrap_or_default());
                let entry = self.groups.entry(cache_key).or_insert(loaded);
                Arc::clone(entry.value())
            }
            Err(e) => {
                warn!(scope = %scope, option = %name, error = %e, "Failed to read option group");
                Arc::new(CanonicalMap::new())
            }
        }
    }

    async fn reload(&self, group: Option<&str>, common: bool) -> CanonicalMap {
        self.flush(group, common);
        self.options(group, common).await.as_ref().clone()
    }

    /// Drops the cached copy of a group.
    pub fn flush(&self, group: Option<&str>, common: bool) {
        let group = keys::group_or_default(group);
        self.groups.remove(&(self.scope(common), group.to_string()));
    }

    async fn save(&self, group: Option<&str>, options: CanonicalMap, common: bool) -> bool {
        self.flush(group, common);

        let scope = self.scope(common);
        let name = self.name_in(scope, group);
        match self.backend.update(scope, &name, options).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(scope = %scope, option = %name, error = %e, "Failed to save option group");
                false
            }
        }
    }

    // ── Values ─────────────────────────────────────────────

    pub async fn exists(&self, key: &str, group: Option<&str>, common: bool) -> bool {
        self.options(group, common).await.contains_key(&Key::from(key))
    }

    /// Reads a value of the default group.
    pub async fn get(&self, key: &str, default: impl Into<Value>, common: bool) -> Value {
        self.get_grouped(key, None, default, common).await
    }

    /// Reads a value, resolving dotted keys into nested maps. The result is
    /// passed through the `{prefix}get_option` filter.
    pub async fn get_grouped(&self, key: &str, group: Option<&str>, default: impl Into<Value>, common: bool) -> Value {
        let default = default.into();
        let options = self.options(group, common).await;
        let value = self.resolver.get(options.as_ref(), key, default.clone());

        self.bus.apply_filters(
            &self.tag(keys::GET_OPTION),
            vec![value, Value::from(key), default, Value::from(group), Value::from(common)],
        )
    }

    /// Writes a value of the default group.
    pub async fn set(&self, key: &str, value: impl Into<Value>, common: bool) -> bool {
        self.set_grouped(key, None, value, common).await
    }

    /// Writes a value when it differs from the stored one, then fires
    /// `{prefix}changed_option`. Returns whether the backend was updated.
    pub async fn set_grouped(&self, key: &str, group: Option<&str>, value: impl Into<Value>, common: bool) -> bool {
        let value = value.into();
        let mut options = self.reload(group, common).await;
        let entry_key = Key::from(key);
        let previous = options.get(&entry_key).cloned();
        if previous.as_ref() == Some(&value) {
            return false;
        }

        options.insert(entry_key, value.clone());
        let result = self.save(group, options, common).await;
        self.bus.do_action(
            &self.tag(keys::CHANGED_OPTION),
            vec![
                Value::from(key),
                value,
                previous.unwrap_or_default(),
                Value::from(group),
                Value::from(common),
            ],
        );
        result
    }

    /// Deletes a value of the default group.
    pub async fn delete(&self, key: &str, common: bool) -> bool {
        self.delete_grouped(Some(key), None, common).await
    }

    /// Deletes a value and fires `{prefix}deleted_option`. A `None` key
    /// empties the whole group.
    pub async fn delete_grouped(&self, key: Option<&str>, group: Option<&str>, common: bool) -> bool {
        let mut options = self.reload(group, common).await;
        let Some(key) = key else {
            if options.is_empty() {
                return false;
            }
            return self.save(group, CanonicalMap::new(), common).await;
        };

        let Some(previous) = options.shift_remove(&Key::from(key)) else {
            return false;
        };
        let result = self.save(group, options, common).await;
        self.bus.do_action(
            &self.tag(keys::DELETED_OPTION),
            vec![Value::from(key), previous, Value::from(common)],
        );
        result
    }

    // ── Cleanup ────────────────────────────────────────────

    /// Deletes every named group whose name starts with the group prefix
    /// followed by `group_prefix`. Returns how many were deleted.
    pub async fn clear_group_option(&self, group_prefix: Option<&str>, common: bool) -> usize {
        let scope = self.scope(common);
        let prefix = format!("{}{}", keys::group_option_prefix(&self.slug), group_prefix.unwrap_or_default());

        let names = match self.backend.names_with_prefix(scope, &prefix).await {
            Ok(names) => names,
            Err(e) => {
                warn!(scope = %scope, prefix = %prefix, error = %e, "Failed to list option groups");
                return 0;
            }
        };

        let mut deleted = 0;
        for name in names {
            match self.backend.delete(scope, &name).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => warn!(scope = %scope, option = %name, error = %e, "Failed to delete option group"),
            }
        }
        self.groups.retain(|(cached_scope, _), _| *cached_scope != scope);
        deleted
    }

    /// Deletes the default group and every named group, in the network
    /// scope as well on multisite installs.
    pub async fn clear_option(&self) {
        let blog = OptionScope::Blog(self.blog_id());
        self.delete_option(blog, &self.option_name(None)).await;
        self.clear_group_option(None, false).await;

        if self.multisite {
            self.delete_option(OptionScope::Network, &self.site_option_name(None)).await;
            self.clear_group_option(None, true).await;
        }
        self.groups.clear();
        info!(plugin = %self.slug, "Options cleared");
    }

    async fn delete_option(&self, scope: OptionScope, name: &str) {
        if let Err(e) = self.backend.delete(scope, name).await {
            warn!(scope = %scope, option = %name, error = %e, "Failed to delete option");
        }
    }

    pub async fn uninstall(&self) {
        self.clear_option().await;
    }

    // ── Activation ─────────────────────────────────────────

    /// Marks the plugin activated and records `plugin_version` as the last
    /// upgrade version if none is stored yet.
    pub async fn app_activated(&self, plugin_version: &str) {
        self.set(keys::APP_ACTIVATED, true, false).await;
        if self.get(keys::LAST_UPGRADE_VERSION, "", false).await.is_empty() {
            self.set(keys::LAST_UPGRADE_VERSION, plugin_version, false).await;
        }
    }

    pub async fn app_deactivated(&self) {
        self.delete(keys::APP_ACTIVATED, false).await;
    }

    pub async fn is_app_activated(&self) -> bool {
        !self.get(keys::APP_ACTIVATED, "", false).await.is_empty()
    }
}

impl std::fmt::Debug for OptionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionStore")
            .field("slug", &self.slug)
            .field("backend", &self.backend)
            .field("multisite", &self.multisite)
            .field("blog_id", &self.blog_id())
            .field("cached_groups", &self.groups.len())
            .finish_non_exhaustive()
    }
}
