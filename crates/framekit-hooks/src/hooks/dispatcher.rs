//! Hook dispatcher: runs filter chains and actions synchronously.
//!
//! For filters:
//! - Callbacks are called in priority order.
//! - Each callback sees the running value as its first argument and its
//!   return value becomes the running value for the next one.
//!
//! For actions:
//! - All callbacks are called with the original arguments.
//! - Return values are discarded.

use std::sync::Arc;

use tracing::{debug, trace};

use framekit_core::traits::{FilterCallback, HookBus};
use framekit_core::types::Value;

use super::registry::HookRegistry;

/// In-process hook bus backed by a [`HookRegistry`].
#[derive(Debug, Clone, Default)]
pub struct FilterBus {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl FilterBus {
    /// Creates a bus with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus over an existing registry.
    pub fn with_registry(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Registers an action callback. Actions share the filter table.
    pub fn add_action(&self, tag: &str, callback: FilterCallback, priority: i32, accepted_args: usize) {
        self.registry.register(tag, callback, priority, accepted_args);
    }

    /// Number of callbacks registered for `tag`.
    pub fn filter_count(&self, tag: &str) -> usize {
        self.registry.handler_count(tag)
    }

    /// Removes every callback for `tag`.
    pub fn remove_filters(&self, tag: &str) -> usize {
        self.registry.remove(tag)
    }

    /// Every tag with at least one callback.
    pub fn tags(&self) -> Vec<String> {
        self.registry.registered_tags()
    }
}

fn accepted<'a>(args: &'a [Value], accepted_args: usize) -> &'a [Value] {
    &args[..accepted_args.min(args.len())]
}

impl HookBus for FilterBus {
    fn add_filter(&self, tag: &str, callback: FilterCallback, priority: i32, accepted_args: usize) {
        self.registry.register(tag, callback, priority, accepted_args);
    }

    fn apply_filters(&self, tag: &str, mut args: Vec<Value>) -> Value {
        // Snapshot so callbacks may register or fire hooks themselves
        let entries = self.registry.entries(tag);

        if args.is_empty() {
            args.push(Value::Null);
        }
        if entries.is_empty() {
            trace!(tag = %tag, "No filters registered");
            return args.swap_remove(0);
        }

        debug!(tag = %tag, handler_count = entries.len(), "Applying filters");

        for entry in &entries {
            let value = (entry.callback)(accepted(&args, entry.accepted_args));
            args[0] = value;
        }

        args.swap_remove(0)
    }

    fn do_action(&self, tag: &str, args: Vec<Value>) {
        let entries = self.registry.entries(tag);
        if entries.is_empty() {
            trace!(tag = %tag, "No actions registered");
            return;
        }

        debug!(tag = %tag, handler_count = entries.len(), "Dispatching action");

        for entry in &entries {
            let _ = (entry.callback)(accepted(&args, entry.accepted_args));
        }
    }

    fn has_filter(&self, tag: &str) -> bool {
        self.registry.has_handlers(tag)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_apply_filters_chains_running_value() {
        let bus = FilterBus::new();
        bus.add_filter(
            "price",
            Arc::new(|args: &[Value]| Value::from(args[0].as_i64().unwrap_or(0) * 2)),
            20,
            1,
        );
        bus.add_filter(
            "price",
            Arc::new(|args: &[Value]| Value::from(args[0].as_i64().unwrap_or(0) + 3)),
            10,
            1,
        );

        // (1 + 3) * 2
        assert_eq!(bus.apply_filters("price", vec![Value::from(1)]), Value::from(8));
    }

    #[test]
    fn test_apply_filters_without_callbacks_passes_through() {
        let bus = FilterBus::new();
        assert_eq!(bus.apply_filters("none", vec![Value::from("x")]), Value::from("x"));
        assert_eq!(bus.apply_filters("none", Vec::new()), Value::Null);
        assert!(!bus.has_filter("none"));
    }

    #[test]
    fn test_callbacks_receive_accepted_args_only() {
        let bus = FilterBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for accepted_args in [0, 2, 100] {
            let seen = seen.clone();
            bus.add_filter(
                "count",
                Arc::new(move |args: &[Value]| {
                    seen.lock().expect("lock").push(args.len());
                    args.first().cloned().unwrap_or_default()
                }),
                10,
                accepted_args,
            );
        }

        bus.apply_filters("count", vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(*seen.lock().expect("lock"), vec![0, 2, 3]);
    }

    #[test]
    fn test_do_action_runs_every_callback_with_original_args() {
        let bus = FilterBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let seen = seen.clone();
            bus.add_action(
                "saved",
                Arc::new(move |args: &[Value]| {
                    seen.lock().expect("lock").push(args[0].clone());
                    Value::from("ignored")
                }),
                10,
                1,
            );
        }

        bus.do_action("saved", vec![Value::from("key")]);
        assert_eq!(*seen.lock().expect("lock"), vec![Value::from("key"), Value::from("key")]);
        assert_eq!(bus.filter_count("saved"), 2);
        assert_eq!(bus.tags(), vec!["saved".to_string()]);
        assert_eq!(bus.remove_filters("saved"), 2);
    }

    #[test]
    fn test_callback_may_register_during_dispatch() {
        let bus = Arc::new(FilterBus::new());
        let inner = bus.clone();
        bus.add_filter(
            "grow",
            Arc::new(move |args: &[Value]| {
                inner.add_filter("grow", Arc::new(|args: &[Value]| args[0].clone()), 10, 1);
                args[0].clone()
            }),
            10,
            1,
        );

        assert_eq!(bus.apply_filters("grow", vec![Value::from(1)]), Value::from(1));
        assert_eq!(bus.filter_count("grow"), 2);
    }
}
