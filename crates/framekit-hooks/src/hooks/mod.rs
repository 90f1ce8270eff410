//! Hook registry and dispatcher.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::FilterBus;
pub use registry::HookRegistry;
