//! Framework settings.
//!
//! Deserialized via the `config` crate from `config/default.toml`, an
//! environment overlay and `FRAMEKIT__*` environment variables. Every field
//! has a default, so an absent file yields a usable configuration.

pub mod logging;
pub mod options;
pub mod plugin;
pub mod versions;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::options::OptionsConfig;
use self::plugin::{PackageConfig, PluginConfig};
use self::versions::VersionsConfig;

use crate::error::AppError;

/// Root framework configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameworkConfig {
    /// The embedding plugin.
    #[serde(default)]
    pub plugin: PluginConfig,
    /// Installed packages in merge order.
    #[serde(default)]
    pub packages: Vec<PackageConfig>,
    /// Version floors and detected versions.
    #[serde(default)]
    pub versions: VersionsConfig,
    /// Option store settings.
    #[serde(default)]
    pub options: OptionsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FrameworkConfig {
    /// Load configuration from `config/default.toml` and `config/{env}.toml`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration from `base` plus an environment overlay next to it.
    ///
    /// Both files are optional. Environment variables prefixed with
    /// `FRAMEKIT__` override file values (`FRAMEKIT__PLUGIN__NAME=shop`).
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let overlay = match base.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{env}"),
            None => env.to_string(),
        };

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix("FRAMEKIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: FrameworkConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[plugin]\nname = \"shop\"\n\n[[packages]]\nname = \"common\"\nconfigs_dir = \"./vendor/common\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.plugin.name, "shop");
        assert_eq!(config.plugin.configs_dir, "./configs");
        assert_eq!(config.packages.len(), 1);
        assert_eq!(config.packages[0].name, "common");
        assert_eq!(config.versions.required_runtime_version, "5.6");
        assert!(!config.options.multisite);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_files_are_not_an_error() {
        let config = FrameworkConfig::load_from("does-not-exist/default", "test").unwrap();
        assert_eq!(config.options.blog_id, 1);
    }
}
