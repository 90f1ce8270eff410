//! Collaborator traits defined in `framekit-core` and implemented by other crates.

pub mod hook;
pub mod option;
pub mod package;

pub use hook::{FilterCallback, FilterTarget, HookBus};
pub use option::{OptionBackend, OptionScope};
pub use package::{Package, PackageRegistry, PartitionSource};
