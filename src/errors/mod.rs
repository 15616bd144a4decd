//! Error types

pub mod engine_error;

pub use engine_error::*;
