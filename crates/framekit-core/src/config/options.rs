//! Option store configuration.

use serde::{Deserialize, Serialize};

/// Option persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Persistence backend. Only `memory` is built in.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Whether the host is a multisite install. Only then do `common`
    /// options use the network scope.
    #[serde(default)]
    pub multisite: bool,
    /// Site the option store starts on.
    #[serde(default = "default_blog_id")]
    pub blog_id: u64,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            multisite: false,
            blog_id: default_blog_id(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_blog_id() -> u64 {
    1
}
