//! Configuration source traits.

use std::fmt;
use std::sync::Arc;

use crate::result::AppResult;
use crate::types::{CanonicalMap, Value};

/// An installed package contributing configuration partitions.
pub trait Package: Send + Sync + fmt::Debug {
    /// Package name, used in diagnostics.
    fn name(&self) -> &str;

    /// The package's contribution to the named partition. Packages without
    /// the partition return an empty map.
    fn config(&self, partition: &str) -> CanonicalMap;
}

/// Lists installed packages. Iteration order is merge precedence: later
/// packages override earlier ones.
pub trait PackageRegistry: Send + Sync + fmt::Debug {
    /// All installed packages in registration order.
    fn packages(&self) -> Vec<Arc<dyn Package>>;
}

/// Loads the plugin's own partitions.
pub trait PartitionSource: Send + Sync + fmt::Debug {
    /// Reads the named partition. `Ok(None)` means the partition does not
    /// exist; errors are reported to the caller, which decides how to degrade.
    fn load_partition(&self, name: &str) -> AppResult<Option<Value>>;
}
