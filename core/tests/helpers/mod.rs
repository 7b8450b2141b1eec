//! Test helper modules for integration tests

pub mod fake_search;

pub use fake_search::*;
