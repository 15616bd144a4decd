//! Arbitrage route types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageRoute {
    pub id: String,
    pub detected_at: DateTime<Utc>,
    pub chain_id: String,
    pub route: Vec<RouteHop>,
    pub legs: usize,
    pub input_token: String,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    pub net_pnl: Decimal,
    pub net_pnl_bps: Decimal,
    pub gas_cost_eth: Decimal,
    pub reason: OpportunityReason,
    pub atomic_safe: bool,
    pub execution_hint: ExecutionHint,
}

impl ArbitrageRoute {
    pub fn dexes(&self) -> Vec<&str> {
        self.route.iter().map(|hop| hop.dex_id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteHop {
    pub dex_id: String,
    pub pair_address: String,
    pub token_in: String,
    pub token_out: String,
    pub fee_bps: u32,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpportunityReason {
    #[serde(rename = "INTER-DEX")]
    InterDex,
    #[serde(rename = "FEE_ARBITRAGE")]
    FeeArbitrage,
    #[serde(rename = "TWAP_DELAY")]
    TwapDelay,
    #[serde(rename = "PRICE_INEFFICIENCY")]
    PriceInefficiency,
}

impl fmt::Display for OpportunityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            OpportunityReason::InterDex => "INTER-DEX",
            OpportunityReason::FeeArbitrage => "FEE_ARBITRAGE",
            OpportunityReason::TwapDelay => "TWAP_DELAY",
            OpportunityReason::PriceInefficiency => "PRICE_INEFFICIENCY",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionHint {
    Flashloan,
    AtomicMulticall,
}
