//! Core data types and structures

pub mod addresses;
pub mod arbitrage;
pub mod asset;
pub mod audit;
pub mod pairs;
pub mod pools;
pub mod validation;

pub use addresses::*;
pub use arbitrage::*;
pub use asset::*;
pub use audit::*;
pub use pairs::*;
pub use pools::*;
pub use validation::*;
