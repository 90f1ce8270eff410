//! Option persistence backend trait.

use std::fmt;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::CanonicalMap;

/// Tenant partition an option is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionScope {
    /// A single site of the install.
    Blog(u64),
    /// Shared by every site of a multisite install.
    Network,
}

impl fmt::Display for OptionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blog(id) => write!(f, "blog:{id}"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// Opaque key-value store holding one map per option name.
#[async_trait]
pub trait OptionBackend: Send + Sync + fmt::Debug + 'static {
    /// Reads an option. Returns `None` if it does not exist.
    async fn get(&self, scope: OptionScope, name: &str) -> AppResult<Option<CanonicalMap>>;

    /// Writes an option. Returns `false` when the stored value was unchanged.
    async fn update(&self, scope: OptionScope, name: &str, value: CanonicalMap) -> AppResult<bool>;

    /// Deletes an option. Returns `false` when it did not exist.
    async fn delete(&self, scope: OptionScope, name: &str) -> AppResult<bool>;

    /// Names of every stored option starting with `prefix`.
    async fn names_with_prefix(&self, scope: OptionScope, prefix: &str) -> AppResult<Vec<String>>;
}
