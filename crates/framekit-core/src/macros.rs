//! Convenience macros for building value trees.

/// Builds a [`CanonicalMap`](crate::types::CanonicalMap) from `key => value`
/// pairs. Keys go through `Key::from`, values through `Value::from`, so nested
/// `canonical!` maps and [`Value::list`](crate::types::Value::list) sequences
/// compose.
///
/// # Example
/// ```rust,ignore
/// let config = canonical! {
///     "required_runtime_version" => "7.4",
///     "db" => canonical! { "host" => "localhost", "port" => 3306 },
///     5 => Value::list(["a", "b"]),
/// };
/// ```
#[macro_export]
macro_rules! canonical {
    () => {
        $crate::types::CanonicalMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::types::CanonicalMap::new();
        $(
            map.insert(
                $crate::types::Key::from($key),
                $crate::types::Value::from($value),
            );
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use crate::types::{Key, Value};

    #[test]
    fn test_canonical_builds_nested_maps() {
        let map = canonical! {
            "a" => 1,
            "b" => canonical! { "c" => "x" },
            "7" => true,
        };
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Key::Int(7)), Some(&Value::Bool(true)));
        let nested = map.get(&Key::from("b")).and_then(Value::as_map).unwrap();
        assert_eq!(nested.get(&Key::from("c")), Some(&Value::from("x")));
        assert!(canonical! {}.is_empty());
    }
}
