//! # framekit-hooks
//!
//! Hook plumbing for framekit. Provides:
//!
//! - [`FilterBus`], an in-process hook bus with priority-ordered filter chains
//! - [`AppContext`], the root object filter targets are resolved from
//! - [`FilterRegistry`], which registers the declarations of the `filter`
//!   config partition and forwards dispatches to their targets
//! - [`System`], runtime and platform version checks

pub mod context;
pub mod filter;
pub mod hooks;
pub mod prelude;
pub mod system;

pub use context::{AppContext, SingletonRegistry};
pub use filter::{FilterRegistry, FilterSubscription};
pub use hooks::{FilterBus, HookRegistry};
pub use system::System;
