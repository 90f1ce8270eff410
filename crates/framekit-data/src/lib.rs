//! # framekit-data
//!
//! Nested-data access for framekit: [`PathResolver`] resolves dotted or
//! segmented key paths over any coercible value, and [`Collection`] wraps a
//! map with transformations that always return a new collection.

pub mod collection;
pub mod resolver;

pub use collection::Collection;
pub use resolver::{AsCanonical, PathResolver, coerce};
