//! Declarative filter registration and dispatch to named targets.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Instant;

use dashmap::DashMap;
use tracing::{debug, info, trace, warn};

use framekit_core::traits::{FilterCallback, FilterTarget, HookBus};
use framekit_core::types::Value;
use framekit_data::AsCanonical;

use super::declaration::{FilterSubscription, parse_method_params, render_tag};
use super::elapsed::{ElapsedLog, ElapsedRecord};
use crate::context::AppContext;

/// Config partition holding filter declarations.
pub const FILTER_PARTITION: &str = "filter";

/// Separator of property paths in target descriptors.
pub const PROPERTY_PATH_SEPARATOR: &str = "->";

/// Registers the declarations of the `filter` partition on a hook bus and
/// forwards every dispatch to the declared target.
///
/// The partition maps a target descriptor to tags, and each tag to a set of
/// method declarations (see [`parse_method_params`]). A descriptor is
/// resolved, in order, as a `a->b` property path from the context, a context
/// property, or a singleton. Resolutions are cached for the registry's
/// lifetime; unresolvable targets pass the filtered value through.
pub struct FilterRegistry {
    context: Arc<AppContext>,
    bus: Arc<dyn HookBus>,
    targets: DashMap<String, Option<Arc<dyn FilterTarget>>>,
    subscriptions: Mutex<Vec<FilterSubscription>>,
    elapsed: ElapsedLog,
    me: Weak<FilterRegistry>,
}

impl FilterRegistry {
    /// Creates an empty registry. Call [`initialize`](Self::initialize) to
    /// register the configured declarations.
    pub fn new(context: Arc<AppContext>, bus: Arc<dyn HookBus>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            context,
            bus,
            targets: DashMap::new(),
            subscriptions: Mutex::new(Vec::new()),
            elapsed: ElapsedLog::new(),
            me: me.clone(),
        })
    }

    /// Registers every declaration of the `filter` partition, after passing
    /// it through the `{prefix}filter` bus filter.
    pub fn initialize(&self) {
        let declarations = self.context.config().load(FILTER_PARTITION);
        let tag = self.context.slug().tag(FILTER_PARTITION);
        let declarations = self
            .bus
            .apply_filters(&tag, vec![Value::Map(declarations.as_ref().clone())]);

        for (class, tags) in declarations.as_canonical().iter() {
            self.register_class_filter(&class.to_string(), tags);
        }

        info!(
            plugin = %self.context.slug(),
            subscriptions = self.subscription_count(),
            "Filters registered"
        );
    }

    /// Registers the tag → methods declarations of one target.
    pub fn register_class_filter(&self, class: &str, tags: &Value) {
        let Value::Map(tags) = tags else {
            debug!(target_class = %class, "Ignoring non-map filter declaration");
            return;
        };
        for (tag, methods) in tags {
            self.register_filter(class, &tag.to_string(), methods);
        }
    }

    /// Registers the method declarations of one target for one tag.
    pub fn register_filter(&self, class: &str, tag: &str, methods: &Value) {
        let slug = self.context.slug();
        let tag = render_tag(tag, &slug.filter_prefix(), slug.framework_prefix());
        if class.is_empty() || tag.is_empty() {
            return;
        }
        let Value::Map(methods) = methods else {
            debug!(target_class = %class, tag = %tag, "Ignoring non-map method declaration");
            return;
        };

        for (key, value) in methods {
            let Some(declaration) = parse_method_params(key, value) else {
                debug!(target_class = %class, tag = %tag, key = %key, "Skipping malformed method declaration");
                continue;
            };

            self.bus.add_filter(
                &tag,
                self.callback(class, &tag, &declaration.method),
                declaration.priority,
                declaration.accepted_args,
            );

            trace!(
                target_class = %class,
                tag = %tag,
                method = %declaration.method,
                priority = declaration.priority,
                "Filter subscribed"
            );

            self.subscriptions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(FilterSubscription {
                    target: class.to_string(),
                    tag: tag.clone(),
                    method: declaration.method,
                    priority: declaration.priority,
                    accepted_args: declaration.accepted_args,
                });
        }
    }

    fn callback(&self, class: &str, tag: &str, method: &str) -> FilterCallback {
        let me = self.me.clone();
        let class = class.to_string();
        let tag = tag.to_string();
        let method = method.to_string();
        Arc::new(move |args: &[Value]| match me.upgrade() {
            Some(registry) => registry.call_filter_callback(&tag, &class, &method, args.to_vec()),
            None => args.first().cloned().unwrap_or_default(),
        })
    }

    /// Forwards a dispatch to `class`'s `method`, timing it.
    ///
    /// Returns the first argument unchanged when the target cannot be
    /// resolved or does not accept the method. Calls made from inside another
    /// dispatch on the same thread are recorded with zero elapsed time.
    pub fn call_filter_callback(&self, tag: &str, class: &str, method: &str, args: Vec<Value>) -> Value {
        let guard = self.elapsed.enter();
        let start = Instant::now();

        let result = self.dispatch(class, method, args);

        let elapsed_ms = if guard.is_outermost() {
            start.elapsed().as_secs_f64() * 1000.0
        } else {
            0.0
        };
        drop(guard);

        self.elapsed.record(ElapsedRecord {
            tag: tag.to_string(),
            target: class.to_string(),
            method: method.to_string(),
            elapsed_ms,
        });
        result
    }

    fn dispatch(&self, class: &str, method: &str, args: Vec<Value>) -> Value {
        let Some(target) = self.target(class) else {
            trace!(target_class = %class, method = %method, "Filter target unavailable");
            return args.into_iter().next().unwrap_or_default();
        };
        if !target.is_filter_callable(method) {
            trace!(target_class = %class, method = %method, "Filter method not callable");
            return args.into_iter().next().unwrap_or_default();
        }
        target.filter_callback(method, args)
    }

    /// The receiver for a target descriptor.
    ///
    /// Nothing resolves while the runtime or platform is below the required
    /// versions, unless the plugin is being uninstalled.
    pub fn target(&self, class: &str) -> Option<Arc<dyn FilterTarget>> {
        if !self.context.is_uninstalling() && !self.context.system().is_enough_version() {
            return None;
        }
        if let Some(cached) = self.targets.get(class) {
            return cached.value().clone();
        }

        let resolved = self.resolve_target(class);
        let entry = self.targets.entry(class.to_string()).or_insert(resolved);
        entry.value().clone()
    }

    fn resolve_target(&self, class: &str) -> Option<Arc<dyn FilterTarget>> {
        let found = if class.contains(PROPERTY_PATH_SEPARATOR) {
            self.walk_property_path(class)
        } else {
            self.context.property(class)
        };
        found.or_else(|| self.singleton(class))
    }

    fn walk_property_path(&self, path: &str) -> Option<Arc<dyn FilterTarget>> {
        let mut segments = path.split(PROPERTY_PATH_SEPARATOR);
        let first = self.context.property(segments.next()?)?;
        segments.try_fold(first, |target, segment| target.property(segment))
    }

    fn singleton(&self, class: &str) -> Option<Arc<dyn FilterTarget>> {
        match self.context.singleton(class) {
            Ok(instance) => instance,
            Err(e) => {
                warn!(target_class = %class, error = %e, "Filter target could not be instantiated");
                None
            }
        }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    pub fn bus(&self) -> &Arc<dyn HookBus> {
        &self.bus
    }

    /// Every registered subscription, in registration order.
    pub fn subscriptions(&self) -> Vec<FilterSubscription> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether a dispatch is running on the current thread.
    pub fn is_running(&self) -> bool {
        self.elapsed.is_running()
    }

    /// Total recorded dispatch time in milliseconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed.total_ms()
    }

    pub fn elapsed_records(&self) -> Vec<ElapsedRecord> {
        self.elapsed.records()
    }

    pub fn elapsed_details(&self) -> Vec<String> {
        self.elapsed.details()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("context", &self.context)
            .field("subscriptions", &self.subscription_count())
            .field("cached_targets", &self.targets.len())
            .finish_non_exhaustive()
    }
}
