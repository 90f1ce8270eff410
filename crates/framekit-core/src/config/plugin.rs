//! Plugin and package configuration.

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_FRAMEWORK_PREFIX;

/// The embedding plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Plugin name, normalised into the slug.
    #[serde(default = "default_name")]
    pub name: String,
    /// Directory holding the plugin's partition files (`<dir>/<partition>.toml`).
    #[serde(default = "default_configs_dir")]
    pub configs_dir: String,
    /// Hook prefix shared by every framekit plugin.
    #[serde(default = "default_framework_prefix")]
    pub framework_prefix: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            configs_dir: default_configs_dir(),
            framework_prefix: default_framework_prefix(),
        }
    }
}

/// An installed package contributing partitions from a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Package name.
    pub name: String,
    /// Directory holding the package's partition files.
    pub configs_dir: String,
}

fn default_name() -> String {
    "framekit_app".to_string()
}

fn default_configs_dir() -> String {
    "./configs".to_string()
}

fn default_framework_prefix() -> String {
    DEFAULT_FRAMEWORK_PREFIX.to_string()
}
