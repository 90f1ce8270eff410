//! Deep merge and version floors.

use std::cmp::Ordering;

use serde::Serialize;

use framekit_core::config::versions::VersionsConfig;
use framekit_core::types::{CanonicalMap, Key, Value, compare_versions};

/// Name of the root partition, the only one carrying version floors.
pub const ROOT_PARTITION: &str = "config";
/// Root partition key of the minimum runtime version.
pub const RUNTIME_FLOOR_KEY: &str = "required_runtime_version";
/// Root partition key of the minimum platform version.
pub const PLATFORM_FLOOR_KEY: &str = "required_platform_version";

/// Merges `overlay` into `base`. Entries whose values are maps on both sides
/// merge recursively; otherwise the overlay value replaces the base value.
pub fn replace_recursive(base: &mut CanonicalMap, overlay: CanonicalMap) {
    for (key, value) in overlay {
        match value {
            Value::Map(incoming) => match base.get_mut(&key) {
                Some(Value::Map(existing)) => replace_recursive(existing, incoming),
                _ => {
                    base.insert(key, Value::Map(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// The most restrictive runtime/platform versions seen across sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionFloors {
    /// Minimum runtime version.
    pub runtime: String,
    /// Minimum platform version.
    pub platform: String,
}

impl VersionFloors {
    pub fn new(runtime: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            platform: platform.into(),
        }
    }

    /// Defaults from the framework settings.
    pub fn from_config(config: &VersionsConfig) -> Self {
        Self::new(
            config.required_runtime_version.clone(),
            config.required_platform_version.clone(),
        )
    }

    /// Reads both floors from a root partition, falling back to `self` for
    /// missing entries.
    pub fn read(&self, partition: &CanonicalMap) -> Self {
        Self {
            runtime: version_entry(partition, RUNTIME_FLOOR_KEY).unwrap_or_else(|| self.runtime.clone()),
            platform: version_entry(partition, PLATFORM_FLOOR_KEY)
                .unwrap_or_else(|| self.platform.clone()),
        }
    }

    /// Raises each floor to the source's value when strictly newer.
    pub fn raise(&mut self, source: &CanonicalMap) {
        raise_to(&mut self.runtime, version_entry(source, RUNTIME_FLOOR_KEY));
        raise_to(&mut self.platform, version_entry(source, PLATFORM_FLOOR_KEY));
    }

    /// Stores both floors in `partition`, replacing whatever was merged there.
    pub fn write_into(&self, partition: &mut CanonicalMap) {
        partition.insert(Key::from(RUNTIME_FLOOR_KEY), Value::from(self.runtime.as_str()));
        partition.insert(Key::from(PLATFORM_FLOOR_KEY), Value::from(self.platform.as_str()));
    }
}

fn raise_to(current: &mut String, candidate: Option<String>) {
    if let Some(candidate) = candidate {
        if compare_versions(current, &candidate) == Ordering::Less {
            *current = candidate;
        }
    }
}

fn version_entry(partition: &CanonicalMap, key: &str) -> Option<String> {
    match partition.get(&Key::from(key))? {
        Value::Null | Value::Map(_) | Value::Object(_) => None,
        scalar => Some(scalar.to_string()),
    }
}
