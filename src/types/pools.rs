//! Pool-related types and structures

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable pool snapshot supplied per scan.
///
/// `price` is the amount of `token1` one unit of `token0` buys at the pool's
/// mid price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub chain_id: String,
    pub dex_id: String,
    pub pair_address: String,
    pub token0: String,
    pub token1: String,
    pub fee_bps: u32,
    pub liquidity_usd: Decimal,
    pub price: Decimal,
}

impl Pool {
    /// Same pool with its address and tokens lower-cased.
    pub fn normalized(&self) -> Pool {
        Pool {
            pair_address: self.pair_address.to_lowercase(),
            token0: self.token0.to_lowercase(),
            token1: self.token1.to_lowercase(),
            ..self.clone()
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// The token received when swapping `token_in` through this pool.
    pub fn other_token(&self, token_in: &str) -> Option<&str> {
        if self.token0 == token_in {
            Some(&self.token1)
        } else if self.token1 == token_in {
            Some(&self.token0)
        } else {
            None
        }
    }
}

/// One record from the pool/price query interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolQuote {
    pub chain_id: String,
    pub dex_id: String,
    pub pool_address: String,
    pub base_address: String,
    pub base_symbol: String,
    pub quote_address: String,
    pub quote_symbol: String,
    pub liquidity_usd: Decimal,
    pub volume_24h: Decimal,
    pub price_native: Decimal,
}

impl PoolQuote {
    /// Converts the quote into a pool with base as `token0`.
    pub fn into_pool(self, fee_bps: u32) -> Pool {
        Pool {
            chain_id: self.chain_id,
            dex_id: self.dex_id,
            pair_address: self.pool_address.to_lowercase(),
            token0: self.base_address.to_lowercase(),
            token1: self.quote_address.to_lowercase(),
            fee_bps,
            liquidity_usd: self.liquidity_usd,
            price: self.price_native,
        }
    }
}
