//! Hook registry: callbacks registered by tag with priority ordering.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info};

use framekit_core::traits::FilterCallback;

/// Entry in the hook registry.
#[derive(Clone)]
pub(crate) struct HookEntry {
    /// The callback.
    pub(crate) callback: FilterCallback,
    /// Priority (lower = earlier execution).
    pub(crate) priority: i32,
    /// Maximum number of arguments passed to the callback.
    pub(crate) accepted_args: usize,
}

impl fmt::Debug for HookEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookEntry")
            .field("priority", &self.priority)
            .field("accepted_args", &self.accepted_args)
            .finish_non_exhaustive()
    }
}

/// Registry of callbacks organized by tag.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Tag → list of entries sorted by priority.
    handlers: RwLock<HashMap<String, Vec<HookEntry>>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for a tag.
    pub fn register(&self, tag: &str, callback: FilterCallback, priority: i32, accepted_args: usize) {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let entries = handlers.entry(tag.to_string()).or_default();

        entries.push(HookEntry {
            callback,
            priority,
            accepted_args,
        });

        // Stable: equal priorities keep registration order
        entries.sort_by_key(|e| e.priority);

        debug!(
            tag = %tag,
            priority = priority,
            accepted_args = accepted_args,
            "Hook callback registered"
        );
    }

    /// Removes every callback for a tag. Returns how many were removed.
    pub fn remove(&self, tag: &str) -> usize {
        let removed = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(tag)
            .map(|entries| entries.len())
            .unwrap_or(0);

        if removed > 0 {
            info!(tag = %tag, removed = removed, "Hook callbacks removed");
        }
        removed
    }

    /// Snapshot of the entries for a tag, sorted by priority.
    pub(crate) fn entries(&self, tag: &str) -> Vec<HookEntry> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns whether any callbacks are registered for a tag.
    pub fn has_handlers(&self, tag: &str) -> bool {
        self.handler_count(tag) > 0
    }

    /// Returns the number of callbacks registered for a tag.
    pub fn handler_count(&self, tag: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Returns all registered tags, sorted.
    pub fn registered_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        tags.sort();
        tags
    }
}
