//! Backend manager that dispatches to the configured option backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use framekit_core::config::options::OptionsConfig;
use framekit_core::error::AppError;
use framekit_core::result::AppResult;
use framekit_core::traits::{OptionBackend, OptionScope};
use framekit_core::types::CanonicalMap;

use crate::memory::MemoryOptionBackend;

/// Option backend selected at construction time from configuration.
#[derive(Debug, Clone)]
pub struct BackendManager {
    /// The inner backend.
    inner: Arc<dyn OptionBackend>,
}

impl BackendManager {
    /// Create a backend manager from configuration.
    pub fn new(config: &OptionsConfig) -> AppResult<Self> {
        let inner: Arc<dyn OptionBackend> = match config.backend.as_str() {
            "memory" => {
                info!("Initializing in-memory option backend");
                Arc::new(MemoryOptionBackend::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown option backend: '{other}'. Supported: memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a backend manager from an existing backend (for testing).
    pub fn from_backend(backend: Arc<dyn OptionBackend>) -> Self {
        Self { inner: backend }
    }

    /// Get a reference to the inner backend.
    pub fn backend(&self) -> &dyn OptionBackend {
        self.inner.as_ref()
    }
}

#[async_trait]
impl OptionBackend for BackendManager {
    async fn get(&self, scope: OptionScope, name: &str) -> AppResult<Option<CanonicalMap>> {
        self.inner.get(scope, name).await
    }

    async fn update(&self, scope: OptionScope, name: &str, value: CanonicalMap) -> AppResult<bool> {
        self.inner.update(scope, name, value).await
    }

    async fn delete(&self, scope: OptionScope, name: &str) -> AppResult<bool> {
        self.inner.delete(scope, name).await
    }

    async fn names_with_prefix(&self, scope: OptionScope, prefix: &str) -> AppResult<Vec<String>> {
        self.inner.names_with_prefix(scope, prefix).await
    }
}
