//! Cross-crate integration tests.

mod config_test;
mod filter_test;
mod helpers;
mod option_test;
