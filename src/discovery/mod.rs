//! Asset discovery from provider data

pub mod candidates;

pub use candidates::*;
