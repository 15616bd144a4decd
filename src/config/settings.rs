//! Engine configuration settings and environment variable handling

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use super::chains::{CHAIN_SPECS, FALLBACK_GAS_PRICE_GWEI, SUPPORTED_DEXES, TWAP_DEXES, chain_spec};

// Profit estimation constants
pub const MIN_PNL_BPS: Decimal = dec!(5);
pub const MAX_GAS_COST_ETH: Decimal = dec!(0.01);
pub const PRICE_IMPACT_FACTOR: Decimal = dec!(0.998);
pub const BASE_GAS: u64 = 21_000;
pub const SWAP_GAS: u64 = 150_000;
pub const FLASHLOAN_GAS: u64 = 50_000;
pub const FEE_SPREAD_ARBITRAGE_BPS: u32 = 20;

/// Test sizes in start-token units, scanned left to right.
pub const TWO_LEG_LADDER: [Decimal; 5] = [dec!(0.01), dec!(0.05), dec!(0.1), dec!(0.5), dec!(1.0)];
pub const THREE_LEG_LADDER: [Decimal; 3] = [dec!(0.01), dec!(0.05), dec!(0.1)];

// Cycle search bounds
pub const MAX_CYCLE_HOPS: usize = 3;
pub const MAX_ROUTES_PER_START_TOKEN: usize = 10;

// Validation policy defaults
pub const TVL_MIN_USD: Decimal = dec!(1_000_000);
pub const ROI_MIN_BPS: Decimal = dec!(5);
pub const MIN_SAFETY_SCORE: u8 = 70;
pub const MIN_HOPS: usize = 2;
pub const MAX_HOPS: usize = 3;
pub const SLIPPAGE_BPS: Decimal = dec!(10);
pub const GAS_COST_FRACTION: Decimal = dec!(0.0005);
pub const PLAN_NOTIONAL_USD: Decimal = dec!(1000);

// Provider constants
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 8;
pub const MIN_PROVIDER_TIMEOUT_SECS: u64 = 5;
pub const MAX_PROVIDER_TIMEOUT_SECS: u64 = 10;
pub const MAX_BATCH_SIZE: usize = 30;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 200;
pub const DEXSCREENER_URL: &str = "https://api.dexscreener.com";
pub const GOPLUS_URL: &str = "https://api.gopluslabs.io";

#[derive(Debug, Clone)]
pub struct ProfitConfig {
    pub min_pnl_bps: Decimal,
    pub gas_price_overrides_gwei: HashMap<String, Decimal>,
    pub twap_dexes: HashSet<String>,
}

impl Default for ProfitConfig {
    fn default() -> Self {
        Self {
            min_pnl_bps: MIN_PNL_BPS,
            gas_price_overrides_gwei: HashMap::new(),
            twap_dexes: TWAP_DEXES.iter().map(|dex| dex.to_string()).collect(),
        }
    }
}

impl ProfitConfig {
    pub fn gas_price_gwei(&self, chain_id: &str) -> Decimal {
        self.gas_price_overrides_gwei
            .get(chain_id)
            .copied()
            .or_else(|| chain_spec(chain_id).map(|spec| spec.gas_price_gwei))
            .unwrap_or(FALLBACK_GAS_PRICE_GWEI)
    }
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub chains: Vec<String>,
    pub interval: Duration,
    pub max_gas_cost_eth: Decimal,
    pub profit: ProfitConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            chains: vec!["ethereum".to_string()],
            interval: Duration::from_secs(10),
            max_gas_cost_eth: MAX_GAS_COST_ETH,
            profit: ProfitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    pub chain_id: String,
    pub enabled: bool,
    pub dexes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    pub tvl_min_usd: Decimal,
    pub roi_min_bps: Decimal,
    pub min_safety_score: u8,
    pub min_hops: usize,
    pub max_hops: usize,
    pub slippage_bps: Decimal,
    pub gas_cost_fraction: Decimal,
    pub plan_notional_usd: Decimal,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tvl_min_usd: TVL_MIN_USD,
            roi_min_bps: ROI_MIN_BPS,
            min_safety_score: MIN_SAFETY_SCORE,
            min_hops: MIN_HOPS,
            max_hops: MAX_HOPS,
            slippage_bps: SLIPPAGE_BPS,
            gas_cost_fraction: GAS_COST_FRACTION,
            plan_notional_usd: PLAN_NOTIONAL_USD,
        }
    }
}

/// Snapshot handed to the validator by reference; the pipeline never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    pub chains: HashMap<String, ChainConfig>,
    pub policy: PolicyConfig,
    pub supported_dexes: HashSet<String>,
}

impl ValidatorConfig {
    /// Every known chain with its default DEX set; only `active` chains are enabled.
    pub fn with_active_chains(active: &[String]) -> Self {
        let chains = CHAIN_SPECS
            .iter()
            .map(|(chain_id, spec)| {
                let chain = ChainConfig {
                    chain_id: chain_id.to_string(),
                    enabled: active.iter().any(|a| a == chain_id),
                    dexes: spec.default_dexes.iter().map(|d| d.to_string()).collect(),
                };
                (chain_id.to_string(), chain)
            })
            .collect();

        Self {
            chains,
            policy: PolicyConfig::default(),
            supported_dexes: SUPPORTED_DEXES.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub dexscreener_url: String,
    pub goplus_url: String,
    pub timeout: Duration,
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            dexscreener_url: DEXSCREENER_URL.to_string(),
            goplus_url: GOPLUS_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            batch_size: MAX_BATCH_SIZE,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub validator: ValidatorConfig,
    pub providers: ProviderConfig,
    pub watch_tokens: HashMap<String, Vec<String>>,
    /// `(chain_id, address)` pairs to validate at startup.
    pub validate_tokens: Vec<(String, String)>,
    pub pools_file: Option<String>,
    pub audit_log_path: String,
}

impl Config {
    pub fn load() -> Self {
        let active_chains = env_list("ACTIVE_CHAINS")
            .unwrap_or_else(|| vec!["ethereum".to_string(), "base".to_string(), "arbitrum".to_string()]);

        let mut validator = ValidatorConfig::with_active_chains(&active_chains);
        for chain in validator.chains.values_mut() {
            if let Some(dexes) = env_list(&format!("DEXES_{}", chain.chain_id.to_uppercase())) {
                chain.dexes = dexes;
            }
        }
        validator.policy = PolicyConfig {
            tvl_min_usd: env_decimal("TVL_MIN_USD")
                .unwrap_or(TVL_MIN_USD)
                .max(Decimal::ZERO),
            roi_min_bps: env_decimal("ROI_MIN_BPS").unwrap_or(ROI_MIN_BPS),
            min_safety_score: env::var("MIN_SAFETY_SCORE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MIN_SAFETY_SCORE)
                .min(100),
            min_hops: env::var("MIN_HOPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MIN_HOPS)
                .max(1),
            max_hops: env::var("MAX_HOPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_HOPS)
                .min(MAX_CYCLE_HOPS),
            slippage_bps: env_decimal("SLIPPAGE_BPS")
                .unwrap_or(SLIPPAGE_BPS)
                .max(Decimal::ZERO),
            gas_cost_fraction: env_decimal("GAS_COST_FRACTION")
                .unwrap_or(GAS_COST_FRACTION)
                .max(Decimal::ZERO)
                .min(Decimal::ONE),
            plan_notional_usd: env_decimal("PLAN_NOTIONAL_USD")
                .unwrap_or(PLAN_NOTIONAL_USD)
                .max(dec!(1)),
        };

        let scanner = ScannerConfig {
            chains: active_chains.clone(),
            interval: Duration::from_secs(
                env::var("SCAN_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10)
                    .max(1),
            ),
            max_gas_cost_eth: env_decimal("MAX_GAS_COST_ETH").unwrap_or(MAX_GAS_COST_ETH),
            profit: ProfitConfig {
                min_pnl_bps: env_decimal("MIN_PNL_BPS").unwrap_or(MIN_PNL_BPS),
                ..ProfitConfig::default()
            },
        };

        let providers = ProviderConfig {
            dexscreener_url: env::var("DEXSCREENER_URL")
                .unwrap_or_else(|_| DEXSCREENER_URL.to_string()),
            goplus_url: env::var("GOPLUS_URL")
                .unwrap_or_else(|_| GOPLUS_URL.to_string()),
            timeout: Duration::from_secs(
                env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS)
                    .clamp(MIN_PROVIDER_TIMEOUT_SECS, MAX_PROVIDER_TIMEOUT_SECS),
            ),
            batch_size: env::var("PROVIDER_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_BATCH_SIZE)
                .clamp(1, MAX_BATCH_SIZE),
            batch_delay: Duration::from_millis(
                env::var("PROVIDER_BATCH_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_BATCH_DELAY_MS),
            ),
        };

        let watch_tokens = active_chains
            .iter()
            .filter_map(|chain| {
                env_list(&format!("WATCH_TOKENS_{}", chain.to_uppercase()))
                    .map(|tokens| (chain.clone(), tokens))
            })
            .collect();

        // VALIDATE_TOKENS=base:0xabc,ethereum:0xdef
        let validate_tokens = env_list("VALIDATE_TOKENS")
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                entry
                    .split_once(':')
                    .map(|(chain, address)| (chain.to_string(), address.to_lowercase()))
            })
            .collect();

        Self {
            scanner,
            validator,
            providers,
            watch_tokens,
            validate_tokens,
            pools_file: env::var("POOLS_FILE").ok(),
            audit_log_path: env::var("AUDIT_LOG_PATH")
                .unwrap_or_else(|_| "output/audit/audit.jsonl".to_string()),
        }
    }
}

fn env_decimal(key: &str) -> Option<Decimal> {
    env::var(key).ok().and_then(|s| Decimal::from_str(s.trim()).ok())
}

fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let items: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_config_falls_back_to_twenty_gwei_for_unknown_chains() {
        let cfg = ProfitConfig::default();
        assert_eq!(cfg.gas_price_gwei("some-new-chain"), dec!(20));
        assert_eq!(cfg.gas_price_gwei("arbitrum"), dec!(0.1));
    }

    #[test]
    fn gas_price_override_wins_over_chain_table() {
        let mut cfg = ProfitConfig::default();
        cfg.gas_price_overrides_gwei.insert("ethereum".to_string(), dec!(7));
        assert_eq!(cfg.gas_price_gwei("ethereum"), dec!(7));
    }

    #[test]
    fn only_active_chains_are_enabled() {
        let cfg = ValidatorConfig::with_active_chains(&["base".to_string()]);
        assert!(cfg.chains["base"].enabled);
        assert!(!cfg.chains["ethereum"].enabled);
        assert!(cfg.chains["base"].dexes.contains(&"aerodrome".to_string()));
        assert_eq!(cfg.policy, PolicyConfig::default());
    }
}
