//! # framekit-config
//!
//! Configuration partitions for framekit. A partition is merged from every
//! installed package (in registration order) and the plugin's own partition
//! file, then cached by [`ConfigStore`] for the lifetime of the process.
//!
//! The root partition (`config`) additionally carries the most restrictive
//! runtime and platform version floors declared by any source.

pub mod loader;
pub mod merge;
pub mod package;
pub mod store;

pub use loader::FileLoader;
pub use merge::{PLATFORM_FLOOR_KEY, ROOT_PARTITION, RUNTIME_FLOOR_KEY, VersionFloors};
pub use package::{DirectoryPackage, PackageList, StaticPackage};
pub use store::ConfigStore;
