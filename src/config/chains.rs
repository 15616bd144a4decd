//! Static per-chain and per-DEX parameters

use lazy_static::lazy_static;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy)]
pub struct ChainSpec {
    pub gas_price_gwei: Decimal,
    /// Numeric chain id used by EVM-keyed services.
    pub evm_chain_id: u64,
    pub default_dexes: &'static [&'static str],
}

pub const FALLBACK_GAS_PRICE_GWEI: Decimal = dec!(20);
pub const DEFAULT_FEE_BPS: u32 = 30;

lazy_static! {
    pub static ref CHAIN_SPECS: HashMap<&'static str, ChainSpec> = HashMap::from([
        ("ethereum", ChainSpec {
            gas_price_gwei: dec!(20),
            evm_chain_id: 1,
            default_dexes: &["uniswap", "sushiswap", "curve", "balancer"],
        }),
        ("bsc", ChainSpec {
            gas_price_gwei: dec!(3),
            evm_chain_id: 56,
            default_dexes: &["pancakeswap", "uniswap", "biswap"],
        }),
        ("polygon", ChainSpec {
            gas_price_gwei: dec!(50),
            evm_chain_id: 137,
            default_dexes: &["quickswap", "uniswap", "sushiswap"],
        }),
        ("arbitrum", ChainSpec {
            gas_price_gwei: dec!(0.1),
            evm_chain_id: 42161,
            default_dexes: &["uniswap", "camelot", "sushiswap"],
        }),
        ("base", ChainSpec {
            gas_price_gwei: dec!(0.05),
            evm_chain_id: 8453,
            default_dexes: &["aerodrome", "uniswap", "baseswap"],
        }),
        ("optimism", ChainSpec {
            gas_price_gwei: dec!(0.05),
            evm_chain_id: 10,
            default_dexes: &["velodrome", "uniswap"],
        }),
    ]);

    pub static ref DEX_FEES_BPS: HashMap<&'static str, u32> = HashMap::from([
        ("uniswap", 30),
        ("sushiswap", 30),
        ("pancakeswap", 25),
        ("biswap", 10),
        ("quickswap", 30),
        ("camelot", 30),
        ("aerodrome", 30),
        ("velodrome", 30),
        ("baseswap", 25),
        ("traderjoe", 30),
        ("curve", 4),
        ("balancer", 30),
    ]);

    /// DEXs an atomic bundle can route through.
    pub static ref SUPPORTED_DEXES: HashSet<&'static str> = HashSet::from([
        "uniswap",
        "sushiswap",
        "pancakeswap",
        "quickswap",
        "camelot",
        "aerodrome",
        "velodrome",
        "traderjoe",
        "curve",
        "balancer",
    ]);

    /// Venues whose oracle price lags spot through a time-weighted average.
    pub static ref TWAP_DEXES: HashSet<&'static str> = HashSet::from([
        "aerodrome",
        "velodrome",
    ]);
}

pub fn chain_spec(chain_id: &str) -> Option<&'static ChainSpec> {
    CHAIN_SPECS.get(chain_id)
}

pub fn dex_fee_bps(dex_id: &str) -> u32 {
    DEX_FEES_BPS.get(dex_id).copied().unwrap_or(DEFAULT_FEE_BPS)
}
