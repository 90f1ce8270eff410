//! Map keys and key paths.

use std::fmt;

use serde::Serialize;

use crate::error::AppError;
use crate::types::value::Value;

/// Delimiter used to split dotted key paths.
pub const PATH_DELIMITER: char = '.';

/// A key of a [`CanonicalMap`](crate::types::CanonicalMap).
///
/// Canonical decimal integer strings are normalised to [`Key::Int`], so `"5"`
/// and `5` address the same entry. `"05"`, `"-0"` and `"5.0"` stay strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(String),
}

impl Key {
    /// Parses a string into a key, normalising canonical integers.
    pub fn parse(raw: &str) -> Self {
        if is_canonical_int(raw) {
            if let Ok(n) = raw.parse::<i64>() {
                return Self::Int(n);
            }
        }
        Self::Str(raw.to_string())
    }

    /// Converts an arbitrary value into a key the way array keys are cast:
    /// bools become `0`/`1`, floats truncate, `Null` becomes `""`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Str(String::new()),
            Value::Bool(b) => Self::Int(i64::from(*b)),
            Value::Int(n) => Self::Int(*n),
            Value::Float(f) => Self::Int(f.trunc() as i64),
            Value::String(s) => Self::parse(s),
            Value::Map(_) => Self::Str("Array".to_string()),
            Value::Object(_) => Self::Str("Object".to_string()),
        }
    }

    /// Returns the integer form, if this is an integer key.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    /// Returns the string form, if this is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Str(s) => Some(s),
        }
    }

    /// Whether this is a string key containing the path delimiter.
    pub fn is_dotted(&self) -> bool {
        matches!(self, Self::Str(s) if s.contains(PATH_DELIMITER))
    }

    /// Splits a dotted string key into its segments. Integer keys never split.
    pub fn segments(&self) -> Vec<Key> {
        match self {
            Self::Int(_) => vec![self.clone()],
            Self::Str(s) => s.split(PATH_DELIMITER).map(Key::parse).collect(),
        }
    }
}

fn is_canonical_int(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    // "-0" is not an integer key
    !(raw.starts_with('-') && digits == "0")
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Self::parse(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&Key> for Key {
    fn from(value: &Key) -> Self {
        value.clone()
    }
}

/// A lookup path into nested maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPath {
    /// No key: operations address the whole container.
    Whole,
    /// An atomic key. String keys containing `.` are split on a miss.
    Key(Key),
    /// An explicit, pre-decomposed sequence of segments.
    Segments(Vec<Key>),
}

impl KeyPath {
    /// Segments used by `set`/`delete`: string keys are always split.
    pub fn write_segments(&self) -> Vec<Key> {
        match self {
            Self::Whole => Vec::new(),
            Self::Key(key) => key.segments(),
            Self::Segments(segments) => segments.clone(),
        }
    }
}

impl From<Key> for KeyPath {
    fn from(value: Key) -> Self {
        Self::Key(value)
    }
}

impl From<&Key> for KeyPath {
    fn from(value: &Key) -> Self {
        Self::Key(value.clone())
    }
}

impl From<&str> for KeyPath {
    fn from(value: &str) -> Self {
        Self::Key(Key::parse(value))
    }
}

impl From<String> for KeyPath {
    fn from(value: String) -> Self {
        Self::Key(Key::parse(&value))
    }
}

impl From<&String> for KeyPath {
    fn from(value: &String) -> Self {
        Self::Key(Key::parse(value))
    }
}

impl From<i64> for KeyPath {
    fn from(value: i64) -> Self {
        Self::Key(Key::Int(value))
    }
}

impl From<i32> for KeyPath {
    fn from(value: i32) -> Self {
        Self::Key(Key::from(value))
    }
}

impl From<usize> for KeyPath {
    fn from(value: usize) -> Self {
        Self::Key(Key::from(value))
    }
}

impl From<Vec<Key>> for KeyPath {
    fn from(value: Vec<Key>) -> Self {
        Self::Segments(value)
    }
}

impl From<&[&str]> for KeyPath {
    fn from(value: &[&str]) -> Self {
        Self::Segments(value.iter().map(|s| Key::parse(s)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(value: [&str; N]) -> Self {
        Self::Segments(value.iter().map(|s| Key::parse(s)).collect())
    }
}

impl<T: Into<KeyPath>> From<Option<T>> for KeyPath {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Whole)
    }
}

impl TryFrom<&Value> for KeyPath {
    type Error = AppError;

    /// Builds a path from a dynamic value. Only `Null`, strings, integers and
    /// maps of strings/integers are accepted.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::Whole),
            Value::Int(n) => Ok(Self::Key(Key::Int(*n))),
            Value::String(s) => Ok(Self::Key(Key::parse(s))),
            Value::Map(map) => map
                .values()
                .map(|segment| match segment {
                    Value::Int(n) => Ok(Key::Int(*n)),
                    Value::String(s) => Ok(Key::parse(s)),
                    other => Err(AppError::invalid_key(format!(
                        "path segment must be a string or integer, got {}",
                        other.type_name()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Segments),
            other => Err(AppError::invalid_key(format!(
                "key must be null, a string, an integer or a sequence, got {}",
                other.type_name()
            ))),
        }
    }
}
