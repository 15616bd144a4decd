//! Swap simulation and route profit estimation

pub mod estimator;
pub mod simulator;

pub use estimator::*;
pub use simulator::*;
