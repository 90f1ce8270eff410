//! The dynamic value model shared by every framekit component.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::export::Exportable;
use crate::types::key::Key;

/// Ordered, unique-keyed mapping used as the universal in-memory
/// representation of every coercible input. Sequences are maps keyed `0..n`.
pub type CanonicalMap = IndexMap<Key, Value>;

/// A dynamically typed value: a scalar, a nested map, or an opaque object.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Nested ordered map.
    Map(CanonicalMap),
    /// Opaque object, coercible through its [`Exportable`] capability.
    Object(Arc<dyn Exportable>),
}

impl Value {
    /// Builds a sequence (a map keyed `0..n`) from the given items.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Map(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (Key::from(i), item.into()))
                .collect(),
        )
    }

    /// Wraps an exportable object.
    pub fn object<T: Exportable>(object: T) -> Self {
        Self::Object(Arc::new(object))
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// "Emptiness" in the loose scripting sense: `Null`, `false`, `0`, `0.0`,
    /// `""`, `"0"` and empty maps are empty. Objects never are.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::Float(f) => *f == 0.0,
            Self::String(s) => s.is_empty() || s == "0",
            Self::Map(m) => m.is_empty(),
            Self::Object(_) => false,
        }
    }

    /// Returns the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the map, if this is a `Map`.
    pub fn as_map(&self) -> Option<&CanonicalMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the map mutably, if this is a `Map`.
    pub fn as_map_mut(&mut self) -> Option<&mut CanonicalMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Numeric view: integers, floats and numeric strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::String(s) => parse_numeric(s),
            _ => None,
        }
    }

    /// Whether the value is a number or a numeric string.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Loose equality: numbers and numeric strings compare by value, maps
    /// compare entry by entry, objects by identity.
    pub fn loose_eq(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a == b;
        }
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.loose_eq(other)))
            }
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Total ordering used by sorting and min/max folds.
    ///
    /// Numeric-like values (numbers and numeric strings) compare numerically,
    /// other strings lexicographically, maps by length then entries; values of
    /// different kinds order by `Null < Bool < number < String < Map < Object`.
    pub fn loose_cmp(&self, other: &Value) -> Ordering {
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.total_cmp(&b);
        }
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Map(a), Self::Map(b)) => a.len().cmp(&b.len()).then_with(|| {
                a.values()
                    .zip(b.values())
                    .map(|(x, y)| x.loose_cmp(y))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            }),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::String(s) if parse_numeric(s).is_some() => 2,
            Self::String(_) => 3,
            Self::Map(_) => 4,
            Self::Object(_) => 5,
        }
    }
}

fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // reject words `f64::from_str` accepts but are not numeric literals
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Map(m) => f.debug_map().entries(m.iter()).finish(),
            Self::Object(_) => write!(f, "Object(<exportable>)"),
        }
    }
}

/// String cast: `Null`/`false` render empty, `true` renders `1`, integral
/// floats drop the fraction, maps render `Array`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null | Self::Bool(false) => Ok(()),
            Self::Bool(true) => write!(f, "1"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{}", *x as i64),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Map(_) => write!(f, "Array"),
            Self::Object(_) => write!(f, "Object"),
        }
    }
}

/// Strict structural equality. `Int(1) != Float(1.0)`; map equality ignores
/// entry order; objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<Key> for Value {
    fn from(value: Key) -> Self {
        match value {
            Key::Int(n) => Self::Int(n),
            Key::Str(s) => Self::String(s),
        }
    }
}

impl From<CanonicalMap> for Value {
    fn from(value: CanonicalMap) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::list(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::list(items),
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Key::parse(&k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    /// Maps keyed exactly `0..n` become arrays, other maps objects.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Map(map) => map_to_json(map),
            Value::Object(object) => map_to_json(&object.export().into_map().unwrap_or_default()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}

fn map_to_json(map: &CanonicalMap) -> serde_json::Value {
    if is_sequential(map) {
        serde_json::Value::Array(map.values().map(serde_json::Value::from).collect())
    } else {
        serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
                .collect(),
        )
    }
}

/// Whether the map's keys are exactly `0..n` in order.
pub fn is_sequential(map: &CanonicalMap) -> bool {
    map.keys()
        .enumerate()
        .all(|(i, key)| key.as_int() == Some(i as i64))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_keys_are_normalised() {
        let value = Value::from(json!({"5": "x", "name": "y"}));
        let map = value.as_map().unwrap();
        assert_eq!(map.get(&Key::Int(5)), Some(&Value::from("x")));
        assert_eq!(map.get(&Key::Str("name".into())), Some(&Value::from("y")));
    }

    #[test]
    fn test_sequential_maps_serialise_as_arrays() {
        let list = Value::list([1, 2, 3]);
        assert_eq!(serde_json::to_value(&list).unwrap(), json!([1, 2, 3]));

        let mut sparse = CanonicalMap::new();
        sparse.insert(Key::Int(0), Value::from(1));
        sparse.insert(Key::Int(3), Value::from(2));
        assert_eq!(
            serde_json::to_value(Value::Map(sparse)).unwrap(),
            json!({"0": 1, "3": 2})
        );
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::from("10").loose_eq(&Value::from(10)));
        assert!(Value::from(1.0).loose_eq(&Value::from(1)));
        assert!(!Value::from("test").loose_eq(&Value::from(0)));
        assert_ne!(Value::from(1.0), Value::from(1));
    }

    #[test]
    fn test_loose_ordering_groups_numbers_before_words() {
        let mut values = vec![
            Value::from("test2"),
            Value::from("10"),
            Value::from(1),
            Value::Null,
            Value::from("9"),
        ];
        values.sort_by(|a, b| a.loose_cmp(b));
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(1),
                Value::from("9"),
                Value::from("10"),
                Value::from("test2"),
            ]
        );
    }

    #[test]
    fn test_emptiness() {
        assert!(Value::from("0").is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::Map(CanonicalMap::new()).is_empty());
        assert!(!Value::from("a").is_empty());
        assert!(!Value::from(-1).is_empty());
    }

    #[test]
    fn test_display_casts() {
        assert_eq!(Value::from(true).to_string(), "1");
        assert_eq!(Value::from(false).to_string(), "");
        assert_eq!(Value::from(2.0).to_string(), "2");
        assert_eq!(Value::list([1]).to_string(), "Array");
    }
}
