//! Core type definitions used across the framekit workspace.

pub mod export;
pub mod fallback;
pub mod key;
pub mod slug;
pub mod value;
pub mod version;

pub use export::{Export, Exportable};
pub use fallback::Fallback;
pub use key::{Key, KeyPath, PATH_DELIMITER};
pub use slug::{DEFAULT_FRAMEWORK_PREFIX, Slug};
pub use value::{CanonicalMap, Value, is_sequential};
pub use version::{compare_versions, is_at_least};
