//! Ordered collection wrapper.

use std::borrow::Cow;
use std::cmp::Ordering;

use framekit_core::types::{CanonicalMap, Export, Exportable, Fallback, Key, KeyPath, Value};
use framekit_core::{AppError, AppResult};

use crate::resolver::{AsCanonical, PathResolver, coerce};

/// An ordered map of values. Every transformation returns a new collection;
/// the receiver is never modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: CanonicalMap,
    resolver: PathResolver,
}

impl Collection {
    /// Wraps an existing map.
    pub fn new(items: CanonicalMap) -> Self {
        Self {
            items,
            resolver: PathResolver::new(),
        }
    }

    /// Builds a collection from any value; scalars become a one-element
    /// collection.
    pub fn from_value(value: &Value) -> Self {
        Self::new(coerce(value, false))
    }

    /// The underlying map.
    pub fn items(&self) -> &CanonicalMap {
        &self.items
    }

    /// Consumes the collection, returning the underlying map.
    pub fn into_items(self) -> CanonicalMap {
        self.items
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.items.iter()
    }

    pub fn flatten(&self, preserve_keys: bool) -> Self {
        Self::new(self.resolver.flatten(&self.items, preserve_keys))
    }

    pub fn set(&self, key: impl Into<KeyPath>, value: impl Into<Value>) -> Self {
        Self::new(self.resolver.set(&self.items, key, value))
    }

    /// Appends `value` under the next integer key (largest integer key + 1).
    pub fn add(&self, value: impl Into<Value>) -> Self {
        let next = self
            .items
            .keys()
            .filter_map(Key::as_int)
            .max()
            .map_or(0, |max| max + 1);
        let mut items = self.items.clone();
        items.insert(Key::Int(next), value.into());
        Self::new(items)
    }

    pub fn delete(&self, key: impl Into<KeyPath>) -> Self {
        Self::new(self.resolver.delete(&self.items, key))
    }

    /// Appends `other` (coerced, scalars wrapped). Integer keys of both sides
    /// are renumbered; string keys of `other` overwrite.
    pub fn merge(&self, other: impl Into<Value>) -> Self {
        let other = coerce(&other.into(), false);
        let mut items = CanonicalMap::with_capacity(self.items.len() + other.len());
        let mut next = 0_i64;
        for (key, value) in self.items.iter().chain(other.iter()) {
            match key {
                Key::Int(_) => {
                    items.insert(Key::Int(next), value.clone());
                    next += 1;
                }
                Key::Str(_) => {
                    items.insert(key.clone(), value.clone());
                }
            }
        }
        Self::new(items)
    }

    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&Value, &Key) -> Value,
    {
        Self::new(
            self.items
                .iter()
                .map(|(key, value)| (key.clone(), f(value, key)))
                .collect(),
        )
    }

    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Value, &Key) -> bool,
    {
        Self::new(
            self.items
                .iter()
                .filter(|(key, value)| predicate(value, key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Drops entries loosely equal to an earlier one, keeping keys.
    ///
    /// Comparison is by value, not by string form: `1`, `1.0` and `"1.0"`
    /// collapse into the first of them.
    pub fn unique(&self) -> Self {
        let mut seen: Vec<&Value> = Vec::new();
        let mut items = CanonicalMap::new();
        for (key, value) in &self.items {
            if seen.iter().any(|prior| prior.loose_eq(value)) {
                continue;
            }
            seen.push(value);
            items.insert(key.clone(), value.clone());
        }
        Self::new(items)
    }

    pub fn values(&self) -> Self {
        self.items.values().cloned().collect()
    }

    pub fn keys(&self) -> Self {
        self.items.keys().cloned().map(Value::from).collect()
    }

    /// Key-preserving slice. A negative `offset` counts from the end; a
    /// negative `length` stops that many entries before the end.
    pub fn slice(&self, offset: i64, length: Option<i64>) -> Self {
        let len = self.items.len() as i64;
        let start = if offset < 0 {
            (len + offset).max(0)
        } else {
            offset.min(len)
        };
        let end = match length {
            None => len,
            Some(length) if length < 0 => (len + length).max(start),
            Some(length) => start.saturating_add(length).min(len),
        };
        if end <= start {
            return Self::default();
        }
        Self::new(
            self.items
                .iter()
                .skip(start as usize)
                .take((end - start) as usize)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// The first `limit` entries, or the last `|limit|` when negative.
    pub fn take(&self, limit: i64) -> Self {
        if limit < 0 {
            self.slice(limit, Some(limit.saturating_neg()))
        } else {
            self.slice(0, Some(limit))
        }
    }

    /// Splits into chunks of at most `size` entries, stored as nested maps
    /// under keys `0..n`. Original keys are kept inside each chunk.
    pub fn chunk(&self, size: i64) -> Self {
        self.chunks(size)
            .into_iter()
            .map(|chunk| Value::Map(chunk.into_items()))
            .collect()
    }

    /// Like [`chunk`](Self::chunk), returning the chunks as collections.
    pub fn chunks(&self, size: i64) -> Vec<Collection> {
        if size <= 0 {
            return Vec::new();
        }
        let entries: Vec<_> = self.items.iter().collect();
        entries
            .chunks(size as usize)
            .map(|chunk| {
                Self::new(
                    chunk
                        .iter()
                        .map(|(key, value)| ((*key).clone(), (*value).clone()))
                        .collect(),
                )
            })
            .collect()
    }

    /// Stable ascending sort by [`Value::loose_cmp`], keeping keys.
    pub fn sort(&self) -> Self {
        self.sort_by(Value::loose_cmp)
    }

    /// Stable sort driven by `compare`, keeping keys.
    pub fn sort_by<F>(&self, compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering,
    {
        let mut items = self.items.clone();
        items.sort_by(|_, a, _, b| compare(a, b));
        Self::new(items)
    }

    pub fn reverse(&self) -> Self {
        let mut items = self.items.clone();
        items.reverse();
        Self::new(items)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any value equals `value` (loosely unless `strict`).
    pub fn exists(&self, value: impl Into<Value>, strict: bool) -> bool {
        self.resolver
            .search_key(&self.items, &value.into(), strict)
            .is_some()
    }

    /// Whether `key` resolves.
    pub fn has(&self, key: impl Into<KeyPath>) -> bool {
        self.resolver.exists(&self.items, key)
    }

    pub fn get<'a>(&self, key: impl Into<KeyPath>, default: impl Into<Fallback<'a>>) -> Value {
        self.resolver.get(&self.items, key, default)
    }

    /// The first value, or `default` when empty.
    pub fn first<'a>(&self, default: impl Into<Fallback<'a>>) -> Value {
        match self.items.first() {
            Some((_, value)) => value.clone(),
            None => default.into().into_value(),
        }
    }

    /// The first value matching `predicate`, or `default`.
    pub fn first_where<'a, F>(&self, predicate: F, default: impl Into<Fallback<'a>>) -> Value
    where
        F: Fn(&Value, &Key) -> bool,
    {
        match self.items.iter().find(|(key, value)| predicate(value, key)) {
            Some((_, value)) => value.clone(),
            None => default.into().into_value(),
        }
    }

    /// See [`PathResolver::search`].
    pub fn search<'a, I, K>(&self, keys: I, default: impl Into<Fallback<'a>>) -> Value
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.resolver.search(&self.items, keys, default)
    }

    /// Extracts `key` from every element, keeping element keys. Elements
    /// lacking `key` get `default` (resolved per miss), or are dropped when
    /// `filter` is set.
    pub fn pluck<'a>(&self, key: impl Into<Key>, default: impl Into<Fallback<'a>>, filter: bool) -> CanonicalMap {
        let key = key.into();
        let default = default.into();
        let mut plucked = CanonicalMap::new();
        for (item_key, item) in &self.items {
            match element_field(item, &key) {
                Some(value) => {
                    plucked.insert(item_key.clone(), value);
                }
                None if filter => {}
                None => {
                    plucked.insert(item_key.clone(), default.resolve());
                }
            }
        }
        plucked
    }

    /// Distinct values of `key` among the elements that have it.
    pub fn pluck_unique(&self, key: impl Into<Key>) -> Vec<Value> {
        Self::new(self.pluck(key, (), true))
            .unique()
            .into_items()
            .into_values()
            .collect()
    }

    /// Re-keys elements by their `key` field, with either the whole element or
    /// its `value` field as the value. Without `key`, the distinct values
    /// become both keys and values.
    pub fn combine(&self, key: Option<Key>, value: Option<Key>) -> CanonicalMap {
        let Some(key) = key else {
            return self
                .unique()
                .items
                .into_values()
                .map(|v| (Key::from_value(&v), v))
                .collect();
        };
        let keys = self.pluck(key, (), false);
        let values = match value {
            Some(value) => self.pluck(value, (), false),
            None => self.items.clone(),
        };
        keys.values()
            .zip(values.into_values())
            .map(|(k, v)| (Key::from_value(k), v))
            .collect()
    }

    /// Left fold: `extract` the first element, then
    /// `combine(accumulator, extract(next))` for the rest in order.
    ///
    /// Returns an `EmptyCollection` error when there is nothing to fold.
    pub fn aggregate<T, C, E>(&self, combine: C, extract: E) -> AppResult<T>
    where
        C: Fn(T, T) -> T,
        E: Fn(&Value) -> T,
    {
        let mut values = self.items.values();
        let first = values
            .next()
            .ok_or_else(|| AppError::empty_collection("cannot aggregate an empty collection"))?;
        Ok(values.fold(extract(first), |acc, next| combine(acc, extract(next))))
    }

    /// Sum of the extracted numbers; `0.0` when empty.
    pub fn sum<E>(&self, extract: E) -> f64
    where
        E: Fn(&Value) -> f64,
    {
        self.aggregate(|a, b| a + b, extract).unwrap_or(0.0)
    }

    /// Product of the extracted numbers; `0.0` when empty.
    pub fn mul<E>(&self, extract: E) -> f64
    where
        E: Fn(&Value) -> f64,
    {
        self.aggregate(|a, b| a * b, extract).unwrap_or(0.0)
    }

    /// Largest extracted value. Ties keep the earlier one.
    pub fn max<T, E>(&self, extract: E) -> Option<T>
    where
        T: PartialOrd,
        E: Fn(&Value) -> T,
    {
        self.aggregate(|now, next| if next > now { next } else { now }, extract)
            .ok()
    }

    /// Smallest extracted value. Ties keep the earlier one.
    pub fn min<T, E>(&self, extract: E) -> Option<T>
    where
        T: PartialOrd,
        E: Fn(&Value) -> T,
    {
        self.aggregate(|now, next| if next < now { next } else { now }, extract)
            .ok()
    }

    /// Mean of the extracted numbers; `0.0` when empty.
    pub fn ave<E>(&self, extract: E) -> f64
    where
        E: Fn(&Value) -> f64,
    {
        if self.is_empty() {
            return 0.0;
        }
        self.sum(extract) / self.count() as f64
    }
}

/// Field `key` of a map or exportable element. Scalars have no fields.
fn element_field(item: &Value, key: &Key) -> Option<Value> {
    match item {
        Value::Map(map) => map.get(key).cloned(),
        Value::Object(_) => coerce(item, true).shift_remove(key),
        _ => None,
    }
}

impl AsCanonical for Collection {
    fn as_canonical(&self) -> Cow<'_, CanonicalMap> {
        Cow::Borrowed(&self.items)
    }
}

impl Exportable for Collection {
    fn export(&self) -> Export {
        Export::Fields(self.items.clone())
    }
}

impl From<CanonicalMap> for Collection {
    fn from(items: CanonicalMap) -> Self {
        Self::new(items)
    }
}

impl From<Collection> for Value {
    fn from(collection: Collection) -> Self {
        Value::Map(collection.items)
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .enumerate()
                .map(|(i, value)| (Key::from(i), value))
                .collect(),
        )
    }
}

impl FromIterator<(Key, Value)> for Collection {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use framekit_core::canonical;
    use framekit_core::error::ErrorKind;

    use super::*;

    fn collection1() -> Collection {
        Collection::new(canonical! {
            0 => 1,
            1 => "test2",
            3 => Value::list(["test3", "test4"]),
            10 => "10",
        })
    }

    fn collection2() -> Collection {
        Collection::from_value(&Value::list([
            Value::list([1, 10]),
            Value::list([2, 20]),
            Value::list([3, 30]),
        ]))
    }

    fn keys(map: &CanonicalMap) -> Vec<Key> {
        map.keys().cloned().collect()
    }

    fn values(map: &CanonicalMap) -> Vec<Value> {
        map.values().cloned().collect()
    }

    fn second(item: &Value) -> f64 {
        item.as_map()
            .and_then(|m| m.get(&Key::Int(1)))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    #[test]
    fn test_from_scalar_wraps() {
        assert_eq!(Collection::from_value(&Value::from(5)).count(), 1);
        assert!(Collection::from_value(&Value::Null).is_empty());
    }

    #[test]
    fn test_flatten() {
        let flat = collection1().flatten(false);
        assert_eq!(keys(flat.items()), (0..5).map(Key::Int).collect::<Vec<_>>());

        let preserved = collection1().flatten(true);
        assert_eq!(keys(preserved.items()), vec![Key::Int(0), Key::Int(1), Key::Int(10)]);
        assert_eq!(
            values(preserved.items()),
            vec![Value::from("test3"), Value::from("test4"), Value::from("10")]
        );
    }

    #[test]
    fn test_set_add_delete_return_new_collections() {
        let original = collection1();
        let added = original.add(11);
        assert_eq!(added.get(11, ()), Value::from(11));
        assert_eq!(original.count(), 4);

        let set = original.set(10, 10);
        assert_eq!(set.get(10, ()), Value::Int(10));
        assert_eq!(original.get(10, ()), Value::from("10"));

        let deleted = original.delete(0).delete(100);
        assert_eq!(keys(deleted.items()), vec![Key::Int(1), Key::Int(3), Key::Int(10)]);
    }

    #[test]
    fn test_merge_renumbers_integer_keys() {
        let merged = collection1().merge(11);
        assert_eq!(keys(merged.items()), (0..5).map(Key::Int).collect::<Vec<_>>());
        assert_eq!(merged.get(4, ()), Value::from(11));

        let merged = collection1().merge(Value::list(["merge1", "merge2"]));
        assert_eq!(merged.count(), 6);
        assert_eq!(merged.get(5, ()), Value::from("merge2"));

        let named = Collection::new(canonical! { "a" => 1, 0 => "x" })
            .merge(canonical! { "a" => 2, 0 => "y" });
        assert_eq!(named.get("a", ()), Value::from(2));
        assert_eq!(named.get(1, ()), Value::from("y"));
    }

    #[test]
    fn test_map_filter_keep_original() {
        let flat = collection1().flatten(false);
        let strings = flat.map(|value, _| Value::from(value.to_string()));
        assert_eq!(strings.get(0, ()), Value::from("1"));

        let only_strings = flat.filter(|value, _| matches!(value, Value::String(_)));
        assert_eq!(keys(only_strings.items()), (1..5).map(Key::Int).collect::<Vec<_>>());
        assert_eq!(flat.count(), 5);
        assert!(collection1().filter(|_, _| false).is_empty());
    }

    #[test]
    fn test_unique_keeps_first() {
        let unique = collection1()
            .flatten(false)
            .merge(Value::list([Value::from(1), Value::from("test2"), Value::from(1)]))
            .unique();
        assert_eq!(keys(unique.items()), (0..5).map(Key::Int).collect::<Vec<_>>());

        let numeric = Collection::from_iter([Value::from(1), Value::from(1.0), Value::from("1.0"), Value::from("2")])
            .unique();
        assert_eq!(values(numeric.items()), vec![Value::from(1), Value::from("2")]);
    }

    #[test]
    fn test_values_and_keys() {
        let values = collection1().values();
        assert_eq!(values.get(3, ()), Value::from("10"));
        let keys = collection1().keys();
        assert_eq!(
            keys.items().values().cloned().collect::<Vec<_>>(),
            vec![Value::from(0), Value::from(1), Value::from(3), Value::from(10)]
        );
    }

    #[test]
    fn test_slice_and_take() {
        let slice = collection1().slice(1, Some(2));
        assert_eq!(keys(slice.items()), vec![Key::Int(1), Key::Int(3)]);

        let head = collection1().take(3);
        assert_eq!(keys(head.items()), vec![Key::Int(0), Key::Int(1), Key::Int(3)]);

        let tail = collection1().take(-1);
        assert_eq!(keys(tail.items()), vec![Key::Int(10)]);

        let list = Collection::from_iter([1, 2, 3, 4].map(Value::from));
        assert_eq!(values(list.take(3).items()), vec![1, 2, 3].into_iter().map(Value::from).collect::<Vec<_>>());
        assert_eq!(keys(list.take(-1).items()), vec![Key::Int(3)]);
        assert!(list.slice(10, None).is_empty());
        assert_eq!(list.slice(1, Some(-1)).count(), 2);
    }

    #[test]
    fn test_slice_and_take_saturate_extreme_bounds() {
        let list = Collection::from_iter([1, 2, 3, 4].map(Value::from));

        let rest = list.slice(1, Some(i64::MAX));
        assert_eq!(keys(rest.items()), vec![Key::Int(1), Key::Int(2), Key::Int(3)]);
        assert_eq!(list.slice(i64::MIN, Some(i64::MIN)).count(), 0);
        assert_eq!(list.slice(i64::MAX, Some(i64::MAX)).count(), 0);

        assert_eq!(list.take(i64::MIN).count(), 4);
        assert_eq!(list.take(i64::MAX).count(), 4);
    }

    #[test]
    fn test_chunk() {
        let chunks = collection1().chunks(3);
        assert_eq!(chunks.len(), 2);
        assert_eq!(keys(chunks[0].items()), vec![Key::Int(0), Key::Int(1), Key::Int(3)]);
        assert_eq!(keys(chunks[1].items()), vec![Key::Int(10)]);

        let nested = collection1().chunk(3);
        assert_eq!(nested.count(), 2);
        assert_eq!(nested.get("1.10", ()), Value::from("10"));
        assert!(collection1().chunk(0).is_empty());
    }

    #[test]
    fn test_sort_and_reverse() {
        let sorted = collection1().flatten(false).sort().values();
        assert_eq!(
            values(sorted.items()),
            vec![
                Value::from(1),
                Value::from("10"),
                Value::from("test2"),
                Value::from("test3"),
                Value::from("test4"),
            ]
        );

        let reversed = collection1().flatten(false).sort().reverse();
        assert_eq!(reversed.first(()), Value::from("test4"));

        let by_length = collection1()
            .flatten(false)
            .sort_by(|a, b| b.to_string().len().cmp(&a.to_string().len()));
        assert_eq!(by_length.first(()), Value::from("test2"));
    }

    #[test]
    fn test_queries() {
        let c = collection1();
        assert_eq!(c.count(), 4);
        assert_eq!(c.flatten(false).count(), 5);
        assert!(c.exists("10", false));
        assert!(c.exists(10, false));
        assert!(!c.exists(10, true));
        assert!(!c.exists("11", false));
        assert!(c.has("3.1"));
        assert_eq!(c.get("10", ()), Value::from("10"));
        assert_eq!(c.get(11, ()), Value::Null);
        assert_eq!(c.first(()), Value::from(1));
        assert_eq!(
            c.first_where(|value, _| value.as_map().is_some(), ()),
            Value::list(["test3", "test4"])
        );
        assert_eq!(Collection::default().first("none"), Value::from("none"));
        assert_eq!(c.search([10], ()), Value::from("10"));
        assert_eq!(c.search([11, 12, 10], "test"), Value::from("10"));
        assert_eq!(c.search([11, 12, 13], "test"), Value::from("test"));
    }

    #[test]
    fn test_pluck() {
        let c = collection1();
        let plucked = c.pluck(1, (), false);
        assert_eq!(keys(&plucked), vec![Key::Int(0), Key::Int(1), Key::Int(3), Key::Int(10)]);
        assert_eq!(plucked.get(&Key::Int(3)), Some(&Value::from("test4")));
        assert_eq!(plucked.get(&Key::Int(0)), Some(&Value::Null));

        let defaulted = c.pluck(1, "test", false);
        assert_eq!(defaulted.get(&Key::Int(10)), Some(&Value::from("test")));

        let filtered = c.pluck(1, (), true);
        assert_eq!(keys(&filtered), vec![Key::Int(3)]);

        let unique = c
            .merge(Value::list([Value::list(["test", "test4"]), Value::list(["test", "test5"])]))
            .pluck_unique(1);
        assert_eq!(unique, vec![Value::from("test4"), Value::from("test5")]);
    }

    #[test]
    fn test_combine() {
        let by_second = collection2().combine(Some(Key::Int(1)), None);
        assert_eq!(keys(&by_second), vec![Key::Int(10), Key::Int(20), Key::Int(30)]);
        assert_eq!(by_second.get(&Key::Int(20)), Some(&Value::list([2, 20])));

        let pairs = collection2().combine(Some(Key::Int(1)), Some(Key::Int(0)));
        assert_eq!(pairs.get(&Key::Int(30)), Some(&Value::from(3)));

        let own = Collection::from_iter(["a", "b", "a"].map(Value::from)).combine(None, None);
        assert_eq!(keys(&own), vec![Key::from("a"), Key::from("b")]);
    }

    #[test]
    fn test_aggregates() {
        let c = collection2();
        assert_eq!(c.aggregate(|a, b| a + b, second).unwrap(), 60.0);
        assert_eq!(c.sum(second), 60.0);
        assert_eq!(c.mul(second), 6000.0);
        assert_eq!(c.max(second), Some(30.0));
        assert_eq!(c.min(second), Some(10.0));
        assert_eq!(c.ave(second), 20.0);

        let empty = Collection::default();
        let err = empty.aggregate(|a: f64, b| a + b, second).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyCollection);
        assert_eq!(empty.sum(second), 0.0);
        assert_eq!(empty.ave(second), 0.0);
        assert_eq!(empty.max(second), None);
    }

    #[test]
    fn test_aggregate_over_named_fields() {
        let c = Collection::from_value(&Value::list([
            canonical! { "a" => 1 },
            canonical! { "a" => 2 },
            canonical! { "a" => 3 },
        ]));
        let a = |item: &Value| {
            item.as_map()
                .and_then(|m| m.get(&Key::from("a")))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        assert_eq!(c.sum(a), 6.0);
        assert_eq!(c.ave(a), 2.0);
    }
}
