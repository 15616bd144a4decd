//! Periodic arbitrage scanning

pub mod scanner;
pub mod source;
pub mod state;

pub use scanner::{OpportunityScanner, TickOutcome};
pub use source::{PoolSource, ProviderPoolSource, StaticPoolSource};
pub use state::{ScanGuard, ScanStats, ScannerState};
