//! In-memory option backend using DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use framekit_core::result::AppResult;
use framekit_core::traits::{OptionBackend, OptionScope};
use framekit_core::types::CanonicalMap;

/// In-memory option backend.
///
/// Like a persistent store, `update` reports `false` when the stored map is
/// already equal to the new one.
#[derive(Debug, Default)]
pub struct MemoryOptionBackend {
    /// (scope, option name) → stored map.
    options: DashMap<(OptionScope, String), CanonicalMap>,
}

impl MemoryOptionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored options across every scope.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[async_trait]
impl OptionBackend for MemoryOptionBackend {
    async fn get(&self, scope: OptionScope, name: &str) -> AppResult<Option<CanonicalMap>> {
        Ok(self
            .options
            .get(&(scope, name.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn update(&self, scope: OptionScope, name: &str, value: CanonicalMap) -> AppResult<bool> {
        let key = (scope, name.to_string());
        if self.options.get(&key).is_some_and(|stored| *stored.value() == value) {
            return Ok(false);
        }
        self.options.insert(key, value);
        debug!(scope = %scope, option = name, "Option updated");
        Ok(true)
    }

    async fn delete(&self, scope: OptionScope, name: &str) -> AppResult<bool> {
        let removed = self.options.remove(&(scope, name.to_string())).is_some();
        if removed {
            debug!(scope = %scope, option = name, "Option deleted");
        }
        Ok(removed)
    }

    async fn names_with_prefix(&self, scope: OptionScope, prefix: &str) -> AppResult<Vec<String>> {
        let mut names: Vec<String> = self
            .options
            .iter()
            .filter(|entry| entry.key().0 == scope && entry.key().1.starts_with(prefix))
            .map(|entry| entry.key().1.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use framekit_core::canonical;

    use super::*;

    #[tokio::test]
    async fn test_update_get_delete() {
        let backend = MemoryOptionBackend::new();
        let scope = OptionScope::Blog(1);

        assert!(backend.get(scope, "a").await.unwrap().is_none());
        assert!(backend.update(scope, "a", canonical! { "k" => 1 }).await.unwrap());
        assert!(!backend.update(scope, "a", canonical! { "k" => 1 }).await.unwrap());
        assert_eq!(backend.get(scope, "a").await.unwrap(), Some(canonical! { "k" => 1 }));

        assert!(backend.delete(scope, "a").await.unwrap());
        assert!(!backend.delete(scope, "a").await.unwrap());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_scopes_are_separate() {
        let backend = MemoryOptionBackend::new();
        backend.update(OptionScope::Blog(1), "a", canonical! { "k" => 1 }).await.unwrap();

        assert!(backend.get(OptionScope::Blog(2), "a").await.unwrap().is_none());
        assert!(backend.get(OptionScope::Network, "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_names_with_prefix() {
        let backend = MemoryOptionBackend::new();
        let scope = OptionScope::Blog(1);
        for name in ["shop_options/b", "shop_options/a", "shop_options", "other/a"] {
            backend.update(scope, name, canonical! { "k" => 1 }).await.unwrap();
        }
        backend.update(OptionScope::Network, "shop_options/c", canonical! { "k" => 1 }).await.unwrap();

        assert_eq!(
            backend.names_with_prefix(scope, "shop_options/").await.unwrap(),
            vec!["shop_options/a".to_string(), "shop_options/b".to_string()]
        );
    }
}
