//! Configuration management for the arbitrage engine

pub mod chains;
pub mod settings;

pub use chains::*;
pub use settings::*;
