//! Pair plan types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use super::Pool;

/// A base/quote pair formed against the quote allowlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub base: String,
    pub quote: String,
    pub quote_symbol: String,
}

/// Routing plan for one pair. The route starts and ends in `token_out` (the
/// quote) and passes through `token_in` (the base asset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPlan {
    pub trace_id: String,
    pub token_in: String,
    pub token_out: String,
    pub route: Vec<String>,
    pub hops: usize,
    /// Absent when the plan failed connectivity checks and was never estimated.
    pub est_profit_bps: Option<Decimal>,
    pub est_gross_bps: Option<Decimal>,
    pub est_gas_usd: Decimal,
    pub est_slippage_bps: Decimal,
    pub atomic: bool,
    pub pools_used: Vec<Pool>,
    pub reasons_block: Vec<String>,
}

impl PairPlan {
    pub fn is_profitable(&self, roi_min_bps: Decimal) -> bool {
        self.est_profit_bps.is_some_and(|bps| bps >= roi_min_bps)
    }
}
