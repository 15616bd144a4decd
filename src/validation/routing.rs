//! Pair plan construction between pair generation and the profit precheck

use rust_decimal::prelude::*;
use crate::{
    arbitrage::simulate_route,
    config::PolicyConfig,
    graph::PoolGraph,
    types::{AssetCandidate, CandidatePair, PairPlan, Pool},
    utils::{BPS_DENOMINATOR, to_bps},
};

/// Round-trip plans for every pair: two-hop plans over the asset's own pools
/// on different DEXs, and three-hop plans that return to the quote through a
/// bridge pool.
pub fn build_pair_plans(
    asset: &AssetCandidate,
    pairs: &[CandidatePair],
    bridge_pools: &[Pool],
    policy: &PolicyConfig,
) -> Vec<PairPlan> {
    let asset_graph = PoolGraph::build(&asset.pools);
    let bridge_graph = PoolGraph::build(bridge_pools);
    let mut plans = Vec::new();

    for pair in pairs {
        let direct = asset_graph.pools_between(&pair.base, &pair.quote);

        for (i, first) in direct.iter().enumerate() {
            for (j, second) in direct.iter().enumerate() {
                if i == j || first.dex_id == second.dex_id {
                    continue;
                }
                plans.extend(plan_from_pools(&asset.trace_id, pair, vec![first.clone(), second.clone()], policy));
            }
        }

        let Some(neighbors) = asset_graph.neighbors(&pair.base) else { continue };
        for first in direct {
            for via in neighbors.iter().filter(|t| **t != pair.quote) {
                let (Some(second), Some(bridge)) = (
                    asset_graph.deepest_pool(&pair.base, via),
                    bridge_graph.deepest_pool(via, &pair.quote),
                ) else {
                    continue;
                };
                let pools = vec![first.clone(), second.clone(), bridge.clone()];
                plans.extend(plan_from_pools(&asset.trace_id, pair, pools, policy));
            }
        }
    }
    plans
}

/// Tags for hops whose pool does not hold the carried token, starting from `start`.
pub fn connectivity_violations(pools: &[Pool], start: &str) -> Vec<String> {
    let mut carried = start;
    for (index, pool) in pools.iter().enumerate() {
        match pool.other_token(carried) {
            Some(next) => carried = next,
            None => return vec![format!("TOKEN_MISMATCH:{}", index)],
        }
    }
    if carried != start {
        return vec!["FINAL_TOKEN_MISMATCH".to_string()];
    }
    Vec::new()
}

/// `(gross_bps, profit_bps)` for one unit of quote sent around `pools`.
pub fn estimate_plan(pools: &[Pool], quote: &str, policy: &PolicyConfig) -> Option<(Decimal, Decimal)> {
    let hops = simulate_route(Decimal::ONE, pools, quote)?;
    let amount_out = hops.last()?.amount_out;
    let gross_bps = to_bps(amount_out.checked_sub(Decimal::ONE)?, Decimal::ONE)?;
    let gas_bps = policy.gas_cost_fraction.checked_mul(BPS_DENOMINATOR)?;
    let profit_bps = gross_bps
        .checked_sub(policy.slippage_bps)?
        .checked_sub(gas_bps)?;
    Some((gross_bps, profit_bps))
}

/// `None` only when estimation overflows; disconnected plans are kept unestimated.
pub fn plan_from_pools(
    trace_id: &str,
    pair: &CandidatePair,
    pools: Vec<Pool>,
    policy: &PolicyConfig,
) -> Option<PairPlan> {
    let reasons_block = connectivity_violations(&pools, &pair.quote);
    let (est_gross_bps, est_profit_bps) = if reasons_block.is_empty() {
        let (gross, profit) = estimate_plan(&pools, &pair.quote, policy)?;
        (Some(gross), Some(profit))
    } else {
        (None, None)
    };

    Some(PairPlan {
        trace_id: trace_id.to_string(),
        token_in: pair.base.clone(),
        token_out: pair.quote.clone(),
        route: pools.iter().map(|p| p.dex_id.clone()).collect(),
        hops: pools.len(),
        est_profit_bps,
        est_gross_bps,
        est_gas_usd: policy.plan_notional_usd.checked_mul(policy.gas_cost_fraction)?,
        est_slippage_bps: policy.slippage_bps,
        atomic: false,
        pools_used: pools,
        reasons_block,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::pool_graph::tests::pool;
    use rust_decimal_macros::dec;

    fn pair() -> CandidatePair {
        CandidatePair {
            base: "tkn".to_string(),
            quote: "usdc".to_string(),
            quote_symbol: "USDC".to_string(),
        }
    }

    fn asset_with(pools: Vec<Pool>) -> AssetCandidate {
        AssetCandidate {
            trace_id: "ethereum:tkn".to_string(),
            chain_id: "ethereum".to_string(),
            address: "tkn".to_string(),
            symbol: "TKN".to_string(),
            decimals: 18,
            score: 90,
            flags: vec![],
            dexes: pools.iter().map(|p| p.dex_id.clone()).collect(),
            pools,
        }
    }

    #[test]
    fn two_hop_plans_cross_dexes_in_both_orders() {
        let asset = asset_with(vec![
            pool("uniswap", "0x1", "tkn", "usdc", dec!(2)),
            pool("sushiswap", "0x2", "tkn", "usdc", dec!(2.1)),
            pool("uniswap", "0x3", "tkn", "usdc", dec!(2.05)),
        ]);
        let plans = build_pair_plans(&asset, &[pair()], &[], &PolicyConfig::default());

        // (0x1,0x2) (0x2,0x1) (0x2,0x3) (0x3,0x2)
        assert_eq!(plans.len(), 4);
        for plan in &plans {
            assert_eq!(plan.hops, 2);
            assert_eq!(plan.route.len(), plan.hops);
            assert_eq!(plan.pools_used.len(), plan.hops);
            assert_ne!(plan.route[0], plan.route[1]);
            assert!(plan.reasons_block.is_empty());
            assert_eq!(plan.token_in, "tkn");
            assert_eq!(plan.token_out, "usdc");
        }
    }

    #[test]
    fn buying_cheap_and_selling_dear_is_profitable() {
        // usdc -> tkn at 1/2 on uniswap, tkn -> usdc at 2.1 on sushiswap: ~+4% gross
        let pools = vec![
            pool("uniswap", "0x1", "tkn", "usdc", dec!(2)),
            pool("sushiswap", "0x2", "tkn", "usdc", dec!(2.1)),
        ];
        let policy = PolicyConfig::default();
        let plan = plan_from_pools("ethereum:tkn", &pair(), pools, &policy).unwrap();

        let gross = plan.est_gross_bps.unwrap();
        let profit = plan.est_profit_bps.unwrap();
        assert!(gross > dec!(350) && gross < dec!(450), "gross {}", gross);
        assert_eq!(profit, gross - dec!(10) - dec!(5));
        assert_eq!(plan.est_gas_usd, dec!(0.5));
        assert_eq!(plan.est_slippage_bps, dec!(10));
        assert!(plan.is_profitable(policy.roi_min_bps));
    }

    #[test]
    fn three_hop_plan_returns_through_bridge_pool() {
        let asset = asset_with(vec![
            pool("uniswap", "0x1", "tkn", "usdc", dec!(2)),
            pool("curve", "0x2", "tkn", "weth", dec!(0.001)),
        ]);
        let bridge = vec![pool("uniswap", "0xb", "weth", "usdc", dec!(2000))];
        let plans = build_pair_plans(&asset, &[pair()], &bridge, &PolicyConfig::default());

        assert_eq!(plans.len(), 1);
        let plan = &plans[0];
        assert_eq!(plan.hops, 3);
        assert_eq!(plan.route, vec!["uniswap", "curve", "uniswap"]);
        assert!(plan.reasons_block.is_empty());
        assert!(plan.est_profit_bps.is_some());
    }

    #[test]
    fn three_hop_plan_needs_a_bridge() {
        let asset = asset_with(vec![
            pool("uniswap", "0x1", "tkn", "usdc", dec!(2)),
            pool("curve", "0x2", "tkn", "weth", dec!(0.001)),
        ]);
        assert!(build_pair_plans(&asset, &[pair()], &[], &PolicyConfig::default()).is_empty());
    }

    #[test]
    fn disconnected_plan_is_tagged_and_not_estimated() {
        let pools = vec![
            pool("uniswap", "0x1", "tkn", "usdc", dec!(2)),
            pool("sushiswap", "0x2", "dai", "weth", dec!(1)),
        ];
        let plan = plan_from_pools("ethereum:tkn", &pair(), pools, &PolicyConfig::default()).unwrap();

        assert_eq!(plan.reasons_block, vec!["TOKEN_MISMATCH:1".to_string()]);
        assert_eq!(plan.est_profit_bps, None);
        assert_eq!(plan.est_gross_bps, None);
        assert!(!plan.is_profitable(dec!(-1000)));
    }

    #[test]
    fn route_ending_elsewhere_is_flagged() {
        let pools = vec![
            pool("uniswap", "0x1", "tkn", "usdc", dec!(2)),
            pool("sushiswap", "0x2", "tkn", "weth", dec!(1)),
        ];
        assert_eq!(connectivity_violations(&pools, "usdc"), vec!["FINAL_TOKEN_MISMATCH".to_string()]);
    }
}
