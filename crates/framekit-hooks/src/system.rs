//! Runtime and platform version checks.

use tracing::debug;

use framekit_config::{ConfigStore, VersionFloors};
use framekit_core::config::versions::VersionsConfig;
use framekit_core::traits::FilterTarget;
use framekit_core::types::{Value, is_at_least};

const FILTER_METHODS: [&str; 3] = [
    "required_runtime_version",
    "required_platform_version",
    "is_enough_version",
];

/// Detected versions compared against the required floors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct System {
    required: VersionFloors,
    runtime_version: String,
    platform_version: String,
}

impl System {
    pub fn new(
        required: VersionFloors,
        runtime_version: impl Into<String>,
        platform_version: impl Into<String>,
    ) -> Self {
        Self {
            required,
            runtime_version: runtime_version.into(),
            platform_version: platform_version.into(),
        }
    }

    /// Floors from the root config partition, detected versions from settings.
    pub fn detect(config: &ConfigStore, versions: &VersionsConfig) -> Self {
        let system = Self::new(
            config.required_versions(),
            versions.runtime_version.clone(),
            versions.platform_version.clone(),
        );
        debug!(
            runtime = %system.runtime_version,
            platform = %system.platform_version,
            required_runtime = %system.required.runtime,
            required_platform = %system.required.platform,
            "System versions detected"
        );
        system
    }

    pub fn required_runtime_version(&self) -> &str {
        &self.required.runtime
    }

    pub fn required_platform_version(&self) -> &str {
        &self.required.platform
    }

    pub fn runtime_version(&self) -> &str {
        &self.runtime_version
    }

    pub fn platform_version(&self) -> &str {
        &self.platform_version
    }

    pub fn is_enough_runtime_version(&self) -> bool {
        is_at_least(&self.runtime_version, &self.required.runtime)
    }

    /// An undetected (empty) platform version never satisfies the floor.
    pub fn is_enough_platform_version(&self) -> bool {
        !self.platform_version.is_empty() && is_at_least(&self.platform_version, &self.required.platform)
    }

    pub fn is_enough_version(&self) -> bool {
        self.is_enough_runtime_version() && self.is_enough_platform_version()
    }
}

impl FilterTarget for System {
    fn is_filter_callable(&self, method: &str) -> bool {
        FILTER_METHODS.contains(&method)
    }

    fn filter_callback(&self, method: &str, args: Vec<Value>) -> Value {
        match method {
            "required_runtime_version" => Value::from(self.required_runtime_version()),
            "required_platform_version" => Value::from(self.required_platform_version()),
            "is_enough_version" => Value::from(self.is_enough_version()),
            _ => args.into_iter().next().unwrap_or_default(),
        }
    }
}
