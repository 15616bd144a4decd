//! DEX Arbitrage Engine - multi-chain arbitrage scanning and asset validation
//!
//! Scans liquidity pools across chains and DEXs for profitable 2- and 3-leg
//! cycles, estimates their value net of fees, price impact and gas, and runs
//! newly discovered tokens through a six-stage validation pipeline backed by
//! an append-only audit trail.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod graph;
pub mod arbitrage;
pub mod scanner;
pub mod discovery;
pub mod validation;
pub mod utils;
pub mod storage;

// Re-export commonly used items
pub use config::Config;
pub use errors::{EngineError, EngineResult, ValidationError};
pub use types::*;
