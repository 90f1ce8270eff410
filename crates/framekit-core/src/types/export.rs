//! Conversion capabilities of opaque objects.

use crate::types::key::Key;
use crate::types::value::{CanonicalMap, Value};

/// How an object turns itself into a [`CanonicalMap`].
///
/// Each variant is one capability; an object declares exactly one.
#[derive(Debug, Clone)]
pub enum Export {
    /// Direct field enumeration.
    Fields(CanonicalMap),
    /// A JSON-serializable representation.
    Json(serde_json::Value),
    /// Iteration over key/value pairs.
    Entries(Vec<(Key, Value)>),
    /// An explicit array export. Scalars are wrapped as `[value]`.
    Array(Value),
    /// JSON text, decoded on demand. Text that does not decode to an array or
    /// object exports nothing.
    JsonText(String),
    /// No conversion capability.
    Opaque,
}

impl Export {
    /// Converts the export into a map. Returns `None` for [`Export::Opaque`].
    pub fn into_map(self) -> Option<CanonicalMap> {
        match self {
            Self::Fields(map) => Some(map),
            Self::Json(json) => Some(value_into_map(Value::from(json))),
            Self::Entries(entries) => Some(entries.into_iter().collect()),
            Self::Array(value) => Some(value_into_map(value)),
            Self::JsonText(text) => match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(json @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => {
                    Some(value_into_map(Value::from(json)))
                }
                _ => Some(CanonicalMap::new()),
            },
            Self::Opaque => None,
        }
    }
}

fn value_into_map(value: Value) -> CanonicalMap {
    match value {
        Value::Null => CanonicalMap::new(),
        Value::Map(map) => map,
        Value::Object(object) => object.export().into_map().unwrap_or_default(),
        scalar => std::iter::once((Key::Int(0), scalar)).collect(),
    }
}

/// An object that can be stored in a [`Value`] and coerced into a map.
pub trait Exportable: Send + Sync + 'static {
    /// Returns this object's conversion capability.
    fn export(&self) -> Export;
}
