//! Dotted-key access over nested maps.
//!
//! Every input is first coerced into a [`CanonicalMap`]. Lookups try an atomic
//! key verbatim before splitting it on `.`, writes always split string keys.
//! Misses never fail: they resolve to the caller's [`Fallback`].

use std::borrow::Cow;

use framekit_core::types::{CanonicalMap, Fallback, Key, KeyPath, Value};

/// Anything that can be viewed as a [`CanonicalMap`].
pub trait AsCanonical {
    /// Borrows the map when possible, coerces otherwise.
    fn as_canonical(&self) -> Cow<'_, CanonicalMap>;
}

impl AsCanonical for CanonicalMap {
    fn as_canonical(&self) -> Cow<'_, CanonicalMap> {
        Cow::Borrowed(self)
    }
}

impl AsCanonical for Value {
    fn as_canonical(&self) -> Cow<'_, CanonicalMap> {
        match self {
            Value::Map(map) => Cow::Borrowed(map),
            other => Cow::Owned(coerce(other, true)),
        }
    }
}

/// Coerces a value into a map.
///
/// Maps pass through and objects convert through their export capability.
/// With `ignore_scalar == false`, scalars whose string form is non-empty (and
/// objects without a capability) are wrapped as `[value]`; everything else
/// becomes an empty map.
pub fn coerce(value: &Value, ignore_scalar: bool) -> CanonicalMap {
    match value {
        Value::Map(map) => map.clone(),
        Value::Object(object) => match object.export().into_map() {
            Some(map) => map,
            None if !ignore_scalar => single(value.clone()),
            None => CanonicalMap::new(),
        },
        scalar if !ignore_scalar && (!scalar.is_empty() || !scalar.to_string().is_empty()) => {
            single(scalar.clone())
        }
        _ => CanonicalMap::new(),
    }
}

fn into_canonical(value: Value) -> CanonicalMap {
    match value {
        Value::Map(map) => map,
        other => coerce(&other, true),
    }
}

fn single(value: Value) -> CanonicalMap {
    std::iter::once((Key::Int(0), value)).collect()
}

/// Walks `segments` below `root`, coercing every intermediate value.
fn walk<'a>(root: &'a CanonicalMap, segments: &[Key]) -> Option<Cow<'a, Value>> {
    let (first, rest) = segments.split_first()?;
    let mut current = Cow::Borrowed(root.get(first)?);
    for segment in rest {
        current = match current {
            Cow::Borrowed(Value::Map(map)) => Cow::Borrowed(map.get(segment)?),
            Cow::Borrowed(other) => Cow::Owned(coerce(other, true).shift_remove(segment)?),
            Cow::Owned(other) => Cow::Owned(into_canonical(other).shift_remove(segment)?),
        };
    }
    Some(current)
}

/// Resolves a path against an already coerced map. `Whole` and empty
/// segment lists resolve to the map itself.
fn resolve<'a>(map: &'a CanonicalMap, path: &KeyPath) -> Option<Cow<'a, Value>> {
    match path {
        KeyPath::Whole => Some(Cow::Owned(Value::Map(map.clone()))),
        KeyPath::Key(key) => match map.get(key) {
            Some(value) => Some(Cow::Borrowed(value)),
            None if key.is_dotted() => walk(map, &key.segments()),
            None => None,
        },
        KeyPath::Segments(segments) if segments.is_empty() => {
            Some(Cow::Owned(Value::Map(map.clone())))
        }
        KeyPath::Segments(segments) => walk(map, segments),
    }
}

fn set_in(map: &mut CanonicalMap, segments: &[Key], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert(last.clone(), value);
        }
        [first, rest @ ..] => {
            let entry = map.entry(first.clone()).or_default();
            if !matches!(entry, Value::Map(_)) {
                *entry = Value::Map(CanonicalMap::new());
            }
            if let Value::Map(child) = entry {
                set_in(child, rest, value);
            }
        }
    }
}

fn delete_in(map: &mut CanonicalMap, segments: &[Key]) {
    match segments {
        [] => {}
        [last] => {
            map.shift_remove(last);
        }
        [first, rest @ ..] => {
            let entry = map.entry(first.clone()).or_default();
            if !matches!(entry, Value::Map(_)) {
                *entry = Value::Map(CanonicalMap::new());
            }
            if let Value::Map(child) = entry {
                delete_in(child, rest);
            }
        }
    }
}

fn flatten_into(map: &CanonicalMap, preserve_keys: bool, out: &mut CanonicalMap) {
    for (key, value) in map {
        match value {
            Value::Map(child) => flatten_into(child, preserve_keys, out),
            leaf if preserve_keys => {
                out.insert(key.clone(), leaf.clone());
            }
            leaf => {
                out.insert(Key::from(out.len()), leaf.clone());
            }
        }
    }
}

/// Stateless nested-data accessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathResolver;

impl PathResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Coerces a value into a map. See [`coerce`].
    pub fn coerce(&self, value: &Value, ignore_scalar: bool) -> CanonicalMap {
        coerce(value, ignore_scalar)
    }

    /// `Null` becomes an empty map, maps stay as they are, anything else is
    /// wrapped as `[value]`.
    pub fn wrap(&self, value: Value) -> CanonicalMap {
        match value {
            Value::Null => CanonicalMap::new(),
            Value::Map(map) => map,
            other => single(other),
        }
    }

    /// Collects leaves depth-first. With `preserve_keys`, later leaves
    /// overwrite earlier ones sharing a key; otherwise leaves are renumbered.
    pub fn flatten<C: AsCanonical + ?Sized>(&self, container: &C, preserve_keys: bool) -> CanonicalMap {
        let mut out = CanonicalMap::new();
        flatten_into(&container.as_canonical(), preserve_keys, &mut out);
        out
    }

    /// Whether `key` resolves. `KeyPath::Whole` always does.
    pub fn exists<C: AsCanonical + ?Sized>(&self, container: &C, key: impl Into<KeyPath>) -> bool {
        let map = container.as_canonical();
        resolve(&map, &key.into()).is_some()
    }

    /// Resolves `key`, returning `None` on a miss.
    pub fn lookup<C: AsCanonical + ?Sized>(&self, container: &C, key: impl Into<KeyPath>) -> Option<Value> {
        let map = container.as_canonical();
        resolve(&map, &key.into()).map(Cow::into_owned)
    }

    /// Resolves `key`, falling back to `default` on a miss. Deferred defaults
    /// run only on a miss.
    pub fn get<'a, C: AsCanonical + ?Sized>(
        &self,
        container: &C,
        key: impl Into<KeyPath>,
        default: impl Into<Fallback<'a>>,
    ) -> Value {
        match self.lookup(container, key) {
            Some(value) => value,
            None => default.into().into_value(),
        }
    }

    /// Returns a copy of the container with `value` stored at `key`.
    /// Missing or non-map intermediate values are replaced by empty maps.
    pub fn set<C: AsCanonical + ?Sized>(
        &self,
        container: &C,
        key: impl Into<KeyPath>,
        value: impl Into<Value>,
    ) -> CanonicalMap {
        let mut map = container.as_canonical().into_owned();
        set_in(&mut map, &key.into().write_segments(), value.into());
        map
    }

    /// Returns a copy of the container without the entry at `key`.
    /// Intermediate values are normalised exactly as in [`set`](Self::set).
    pub fn delete<C: AsCanonical + ?Sized>(&self, container: &C, key: impl Into<KeyPath>) -> CanonicalMap {
        let mut map = container.as_canonical().into_owned();
        delete_in(&mut map, &key.into().write_segments());
        map
    }

    /// Returns the value of the first key present at the top level, trying
    /// `keys` in order. Keys are never split.
    pub fn search<'a, C, I, K>(&self, container: &C, keys: I, default: impl Into<Fallback<'a>>) -> Value
    where
        C: AsCanonical + ?Sized,
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let map = container.as_canonical();
        keys.into_iter()
            .find_map(|key| {
                let key: Key = key.into();
                map.get(&key).cloned()
            })
            .unwrap_or_else(|| default.into().into_value())
    }

    /// Key of the first entry equal to `value`; loosely equal unless `strict`.
    pub fn search_key<C: AsCanonical + ?Sized>(&self, container: &C, value: &Value, strict: bool) -> Option<Key> {
        container
            .as_canonical()
            .iter()
            .find(|(_, candidate)| {
                if strict {
                    *candidate == value
                } else {
                    candidate.loose_eq(value)
                }
            })
            .map(|(key, _)| key.clone())
    }
}
