//! Filter declarations as written in the `filter` config partition.
//!
//! ```toml
//! [system."${prefix}app_initialized"]
//! 0 = "setup"                 # bare method
//! check = 5                   # method with priority
//! report = [20, 1]            # method with priority and accepted args
//! ```

use serde::Serialize;

use framekit_core::types::{CanonicalMap, Key, Value};

/// Priority used when a declaration omits it.
pub const DEFAULT_PRIORITY: i32 = 10;
/// Accepted argument count used when a declaration omits it.
pub const DEFAULT_ACCEPTED_ARGS: usize = 100;

/// Placeholder replaced by the plugin's filter prefix.
pub const PREFIX_PLACEHOLDER: &str = "${prefix}";
/// Placeholder replaced by the shared framework prefix.
pub const FRAMEWORK_PLACEHOLDER: &str = "${framework}";

/// One parsed method entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDeclaration {
    pub method: String,
    pub priority: i32,
    pub accepted_args: usize,
}

/// A filter registered on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSubscription {
    /// Target descriptor the callback is forwarded to.
    pub target: String,
    /// Tag after placeholder substitution.
    pub tag: String,
    pub method: String,
    pub priority: i32,
    pub accepted_args: usize,
}

/// Parses one `key => value` entry of a method set.
///
/// - integer key, string value: the value is the method name
/// - string key, integer value: the key is the method name, the value its priority
/// - string key, map value: the key is the method name, the value `[priority, accepted_args]`
///
/// Anything else, including an empty method name, yields `None`.
pub fn parse_method_params(key: &Key, value: &Value) -> Option<FilterDeclaration> {
    let (method, params) = match (key, value) {
        (Key::Int(_), Value::String(method)) => (method.as_str(), None),
        (Key::Str(method), Value::Int(priority)) => (method.as_str(), Some(Params::Priority(*priority))),
        (Key::Str(method), Value::Map(params)) => (method.as_str(), Some(Params::List(params))),
        _ => return None,
    };
    if Value::from(method).is_empty() {
        return None;
    }

    let (priority, accepted_args) = match params {
        None => (DEFAULT_PRIORITY, DEFAULT_ACCEPTED_ARGS),
        Some(Params::Priority(priority)) => (clamp_priority(priority), DEFAULT_ACCEPTED_ARGS),
        Some(Params::List(params)) => (
            params
                .get(&Key::Int(0))
                .and_then(Value::as_i64)
                .map(clamp_priority)
                .unwrap_or(DEFAULT_PRIORITY),
            params
                .get(&Key::Int(1))
                .and_then(Value::as_i64)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(DEFAULT_ACCEPTED_ARGS),
        ),
    };

    Some(FilterDeclaration {
        method: method.to_string(),
        priority,
        accepted_args,
    })
}

enum Params<'a> {
    Priority(i64),
    List(&'a CanonicalMap),
}

fn clamp_priority(priority: i64) -> i32 {
    i32::try_from(priority).unwrap_or(if priority < 0 { i32::MIN } else { i32::MAX })
}

/// Substitutes the prefix placeholders of a tag template.
pub fn render_tag(template: &str, filter_prefix: &str, framework_prefix: &str) -> String {
    template
        .replace(PREFIX_PLACEHOLDER, filter_prefix)
        .replace(FRAMEWORK_PLACEHOLDER, framework_prefix)
}
