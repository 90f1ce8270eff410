//! Plugin slug and the prefixes derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hook prefix shared by every plugin built on framekit.
pub const DEFAULT_FRAMEWORK_PREFIX: &str = "framekit/";

/// The embedding plugin's identifier.
///
/// Names are normalised to lowercase with whitespace replaced by `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug {
    name: String,
    framework_prefix: String,
}

impl Slug {
    /// Create a slug with the default framework prefix.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name
            .as_ref()
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c.to_ascii_lowercase() })
            .collect();
        Self {
            name,
            framework_prefix: DEFAULT_FRAMEWORK_PREFIX.to_string(),
        }
    }

    /// Override the shared framework prefix.
    pub fn with_framework_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.framework_prefix = prefix.into();
        self
    }

    /// The normalised slug.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Prefix of every hook tag owned by this plugin: `"{slug}/"`.
    pub fn filter_prefix(&self) -> String {
        format!("{}/", self.name)
    }

    /// Prefix shared by every framekit plugin.
    pub fn framework_prefix(&self) -> &str {
        &self.framework_prefix
    }

    /// `"{slug}{suffix}"`, e.g. `"shop_options"`.
    pub fn suffixed(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.name)
    }

    /// A tag owned by this plugin: `"{slug}/{name}"`.
    pub fn tag(&self, name: &str) -> String {
        format!("{}/{name}", self.name)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
