//! Literal or lazily computed default values.

use std::fmt;

use crate::types::value::Value;

/// A default value supplied to a lookup.
///
/// `Deferred` suppliers run only when the lookup misses.
pub enum Fallback<'a> {
    /// A literal default.
    Value(Value),
    /// A supplier invoked on miss.
    Deferred(Box<dyn Fn() -> Value + Send + Sync + 'a>),
}

impl<'a> Fallback<'a> {
    /// Wraps a supplier.
    pub fn deferred<F>(supplier: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'a,
    {
        Self::Deferred(Box::new(supplier))
    }

    /// Produces the default, invoking the supplier if deferred.
    pub fn resolve(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Deferred(supplier) => supplier(),
        }
    }

    /// Consumes the fallback, invoking the supplier if deferred.
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Deferred(supplier) => supplier(),
        }
    }
}

impl Default for Fallback<'_> {
    fn default() -> Self {
        Self::Value(Value::Null)
    }
}

impl fmt::Debug for Fallback<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Deferred(_) => write!(f, "Deferred(<fn>)"),
        }
    }
}

impl From<Value> for Fallback<'_> {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<()> for Fallback<'_> {
    fn from(_: ()) -> Self {
        Self::Value(Value::Null)
    }
}

impl From<&str> for Fallback<'_> {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for Fallback<'_> {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for Fallback<'_> {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i32> for Fallback<'_> {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for Fallback<'_> {
    fn from(value: bool) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for Fallback<'_> {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}
