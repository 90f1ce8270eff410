//! In-process option backend.

pub mod store;

pub use store::MemoryOptionBackend;
