//! # framekit-option
//!
//! Persisted plugin options. Options live in named groups, each stored as one
//! map under a name derived from the plugin slug:
//!
//! - **default group**: `{slug}_options`
//! - **named group**: `{slug}_options/{group}`
//!
//! On a multisite install, `common` options are stored in the network scope
//! instead of the current blog. The backend is selected from configuration.

pub mod keys;
pub mod memory;
pub mod provider;
pub mod store;

pub use memory::MemoryOptionBackend;
pub use provider::BackendManager;
pub use store::OptionStore;
