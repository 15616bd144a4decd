//! Assembling asset candidates from provider data

use tracing::{debug, info, warn};
use crate::{
    config::dex_fee_bps,
    errors::{EngineError, EngineResult},
    network::{PriceProvider, SecurityProvider},
    types::{AssetCandidate, Pool, quote_tokens, trace_id},
};

/// EVM ERC-20 default; neither provider reports token decimals.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Builds the candidate for `address` on `chain_id`.
///
/// Pools come from the price provider, score and flags from the security
/// provider. A token without a security report is an error rather than a
/// default score.
pub async fn discover_candidate(
    prices: &dyn PriceProvider,
    security: &dyn SecurityProvider,
    chain_id: &str,
    address: &str,
) -> EngineResult<AssetCandidate> {
    let address = address.to_lowercase();
    let trace_id = trace_id(chain_id, &address);
    let tokens = [address.clone()];

    let quotes = prices.pools_for_tokens(chain_id, &tokens, None).await?;
    let mut reports = security.security_reports(chain_id, &tokens).await?;
    let report = reports
        .remove(&address)
        .ok_or_else(|| EngineError::NoSecurityData { trace_id: trace_id.clone() })?;

    let symbol = quotes
        .iter()
        .find_map(|q| {
            if q.base_address == address {
                Some(q.base_symbol.clone())
            } else if q.quote_address == address {
                Some(q.quote_symbol.clone())
            } else {
                None
            }
        })
        .unwrap_or_default();

    let pools: Vec<Pool> = quotes
        .into_iter()
        .map(|quote| {
            let fee_bps = dex_fee_bps(&quote.dex_id);
            quote.into_pool(fee_bps)
        })
        .filter(|pool| pool.chain_id == chain_id && pool.contains(&address))
        .collect();

    let mut dexes: Vec<String> = pools.iter().map(|p| p.dex_id.clone()).collect();
    dexes.sort();
    dexes.dedup();

    info!(trace_id = %trace_id, symbol = %symbol, pools = pools.len(), score = report.score, "candidate assembled");
    Ok(AssetCandidate {
        trace_id,
        chain_id: chain_id.to_string(),
        address,
        symbol,
        decimals: DEFAULT_DECIMALS,
        score: report.score,
        flags: report.flags,
        pools,
        dexes,
    })
}

/// Pools directly between two allowlisted quote tokens on `chain_id`.
///
/// Unreachable provider data yields no bridge pools rather than an error.
pub async fn fetch_bridge_pools(prices: &dyn PriceProvider, chain_id: &str) -> EngineResult<Vec<Pool>> {
    let quotes: Vec<String> = quote_tokens(chain_id).iter().map(|q| q.address.to_string()).collect();
    if quotes.is_empty() {
        return Ok(Vec::new());
    }

    let fetched = match prices.pools_for_tokens(chain_id, &quotes, None).await {
        Ok(fetched) => fetched,
        Err(e) if e.is_data_unavailable() => {
            warn!(chain = %chain_id, error = %e, "bridge pools unavailable, 3-hop plans skipped");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let pools: Vec<Pool> = fetched
        .into_iter()
        .map(|quote| {
            let fee_bps = dex_fee_bps(&quote.dex_id);
            quote.into_pool(fee_bps)
        })
        .filter(|pool| {
            pool.chain_id == chain_id && quotes.contains(&pool.token0) && quotes.contains(&pool.token1)
        })
        .collect();

    debug!(chain = %chain_id, bridge_pools = pools.len(), "bridge pools fetched");
    Ok(pools)
}
