//! Asset validation: stage checks, pair plan construction and the orchestrator

pub mod pipeline;
pub mod routing;
pub mod stages;

pub use pipeline::*;
pub use routing::*;
pub use stages::*;
