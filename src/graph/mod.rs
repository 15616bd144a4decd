//! Pool graph construction and cycle enumeration

pub mod cycles;
pub mod pool_graph;

pub use cycles::*;
pub use pool_graph::{PoolGraph, pair_key};
