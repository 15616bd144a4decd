//! Third-party data providers

pub mod dexscreener;
pub mod goplus;
pub mod providers;

pub use dexscreener::DexScreenerClient;
pub use goplus::GoPlusClient;
pub use providers::{PriceProvider, SecurityProvider};
