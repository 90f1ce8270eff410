//! Prelude for filter target implementations.

pub use framekit_core::canonical;
pub use framekit_core::traits::{FilterCallback, FilterTarget, HookBus};
pub use framekit_core::types::{CanonicalMap, Key, Slug, Value};
pub use framekit_core::{AppError, AppResult};

pub use crate::context::AppContext;
pub use crate::filter::FilterRegistry;
pub use crate::hooks::FilterBus;
