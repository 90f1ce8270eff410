//! Version floor configuration.

use serde::{Deserialize, Serialize};

/// Default version floors and the detected host versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsConfig {
    /// Runtime version floor used when no source declares one.
    #[serde(default = "default_required_runtime")]
    pub required_runtime_version: String,
    /// Platform version floor used when no source declares one.
    #[serde(default = "default_required_platform")]
    pub required_platform_version: String,
    /// Version of the runtime the plugin runs on.
    #[serde(default = "default_runtime")]
    pub runtime_version: String,
    /// Version of the host platform.
    #[serde(default = "default_platform")]
    pub platform_version: String,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            required_runtime_version: default_required_runtime(),
            required_platform_version: default_required_platform(),
            runtime_version: default_runtime(),
            platform_version: default_platform(),
        }
    }
}

fn default_required_runtime() -> String {
    "5.6".to_string()
}

fn default_required_platform() -> String {
    "3.9.3".to_string()
}

fn default_runtime() -> String {
    "8.2".to_string()
}

fn default_platform() -> String {
    "6.4".to_string()
}
