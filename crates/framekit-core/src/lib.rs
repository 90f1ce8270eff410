//! # framekit-core
//!
//! Core crate for framekit. Contains the dynamic value model (keys, key
//! paths, values, defaults), version comparison, the framework settings
//! schema, the collaborator traits and the unified error system.
//!
//! This crate has **no** internal dependencies on other framekit crates.

pub mod config;
pub mod error;
pub mod macros;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
