//! Hook bus and filter receiver traits.

use std::sync::Arc;

use crate::types::Value;

/// A callback registered on a hook bus. Receives the positional arguments of
/// the dispatch (the running value first) and returns the new value.
pub type FilterCallback = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Named publish/subscribe bus with priority-ordered filter chains.
pub trait HookBus: Send + Sync {
    /// Registers `callback` for `tag`. Lower priorities run first; callbacks
    /// receive at most `accepted_args` arguments.
    fn add_filter(&self, tag: &str, callback: FilterCallback, priority: i32, accepted_args: usize);

    /// Runs the filter chain for `tag` and returns the filtered first argument.
    fn apply_filters(&self, tag: &str, args: Vec<Value>) -> Value;

    /// Runs every callback for `tag`, discarding results.
    fn do_action(&self, tag: &str, args: Vec<Value>);

    /// Whether any callback is registered for `tag`.
    fn has_filter(&self, tag: &str) -> bool;
}

/// A receiver that filter subscriptions can be forwarded to.
pub trait FilterTarget: Send + Sync {
    /// Whether `method` may be invoked through [`filter_callback`](Self::filter_callback).
    fn is_filter_callable(&self, method: &str) -> bool;

    /// Invokes `method` with the dispatch arguments.
    fn filter_callback(&self, method: &str, args: Vec<Value>) -> Value;

    /// A named child receiver, used to walk `a->b` target paths.
    fn property(&self, _name: &str) -> Option<Arc<dyn FilterTarget>> {
        None
    }
}
