//! Data persistence and file operations

pub mod audit;
pub mod opportunities;

pub use audit::*;
pub use opportunities::*;
