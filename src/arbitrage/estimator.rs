//! Route-level profit estimation with a gas-cost model

use chrono::Utc;
use rust_decimal::prelude::*;
use std::collections::HashSet;
use tracing::trace;
use crate::{
    arbitrage::simulate_route,
    config::{
        BASE_GAS, FEE_SPREAD_ARBITRAGE_BPS, FLASHLOAN_GAS, ProfitConfig, SWAP_GAS,
        THREE_LEG_LADDER, TWO_LEG_LADDER,
    },
    graph::Cycle,
    types::{ArbitrageRoute, ExecutionHint, OpportunityReason, Pool, RouteHop},
    utils::{gas_cost_native, to_bps},
};

pub fn gas_units(legs: usize) -> u64 {
    let flashloan = if legs > 1 { FLASHLOAN_GAS } else { 0 };
    BASE_GAS + legs as u64 * SWAP_GAS + flashloan
}

/// [`estimate_route_with_rate`] for a route whose input token is the chain's native token.
pub fn estimate_route(
    pools: &[Pool],
    input_token: &str,
    amount_in: Decimal,
    chain_id: &str,
    cfg: &ProfitConfig,
) -> Option<ArbitrageRoute> {
    estimate_route_with_rate(pools, input_token, amount_in, Decimal::ONE, chain_id, cfg)
}

/// Net value of sending `amount_in` of `input_token` around `pools`.
///
/// `native_rate` is how many `input_token` units one native unit is worth;
/// the gas cost is converted with it before it is subtracted. Returns
/// `None` for routes that do not close back into `input_token`, for any
/// undefined or overflowing intermediate value, and whenever `net_pnl_bps`
/// does not exceed the configured minimum.
pub fn estimate_route_with_rate(
    pools: &[Pool],
    input_token: &str,
    amount_in: Decimal,
    native_rate: Decimal,
    chain_id: &str,
    cfg: &ProfitConfig,
) -> Option<ArbitrageRoute> {
    if pools.is_empty() || amount_in <= Decimal::ZERO || native_rate <= Decimal::ZERO {
        return None;
    }
    let simulated = simulate_route(amount_in, pools, input_token)?;
    let last = simulated.last()?;
    if last.token_out != input_token {
        return None;
    }
    let amount_out = last.amount_out;

    let legs = pools.len();
    let gas_cost_eth = gas_cost_native(gas_units(legs), cfg.gas_price_gwei(chain_id))?;
    let gas_cost_input = gas_cost_eth.checked_mul(native_rate)?;
    let net_pnl = amount_out.checked_sub(amount_in)?.checked_sub(gas_cost_input)?;
    let net_pnl_bps = to_bps(net_pnl, amount_in)?;

    if net_pnl_bps <= cfg.min_pnl_bps {
        trace!(chain = %chain_id, legs, %net_pnl_bps, "route below profit threshold");
        return None;
    }

    let route = pools
        .iter()
        .zip(simulated)
        .map(|(pool, hop)| RouteHop {
            dex_id: pool.dex_id.clone(),
            pair_address: pool.pair_address.clone(),
            token_in: hop.token_in,
            token_out: hop.token_out,
            fee_bps: pool.fee_bps,
            amount_in: hop.amount_in,
            amount_out: hop.amount_out,
        })
        .collect();

    Some(ArbitrageRoute {
        id: uuid::Uuid::new_v4().to_string(),
        detected_at: Utc::now(),
        chain_id: chain_id.to_string(),
        route,
        legs,
        input_token: input_token.to_string(),
        amount_in,
        amount_out,
        net_pnl,
        net_pnl_bps,
        gas_cost_eth,
        reason: classify_reason(pools, cfg),
        atomic_safe: true,
        execution_hint: if legs <= 2 {
            ExecutionHint::Flashloan
        } else {
            ExecutionHint::AtomicMulticall
        },
    })
}

/// First matching tag wins, in the order they are checked.
pub fn classify_reason(pools: &[Pool], cfg: &ProfitConfig) -> OpportunityReason {
    let dexes: HashSet<&str> = pools.iter().map(|p| p.dex_id.as_str()).collect();
    if dexes.len() > 1 {
        return OpportunityReason::InterDex;
    }

    let max_fee = pools.iter().map(|p| p.fee_bps).max().unwrap_or(0);
    let min_fee = pools.iter().map(|p| p.fee_bps).min().unwrap_or(0);
    if max_fee - min_fee > FEE_SPREAD_ARBITRAGE_BPS {
        return OpportunityReason::FeeArbitrage;
    }

    if dexes.iter().any(|dex| cfg.twap_dexes.contains(*dex)) {
        return OpportunityReason::TwapDelay;
    }

    OpportunityReason::PriceInefficiency
}

/// Tries every test size on the ladder for the cycle's length.
///
/// `native_rate` prices gas in start-token units, as in
/// [`estimate_route_with_rate`]. Highest `net_pnl_bps` wins; on a tie the
/// earlier ladder entry is kept.
pub fn best_over_ladder(
    cycle: &Cycle,
    native_rate: Decimal,
    chain_id: &str,
    cfg: &ProfitConfig,
) -> Option<ArbitrageRoute> {
    let ladder: &[Decimal] = if cycle.legs() <= 2 {
        &TWO_LEG_LADDER
    } else {
        &THREE_LEG_LADDER
    };

    let mut best: Option<ArbitrageRoute> = None;
    for &amount_in in ladder {
        let Some(candidate) =
            estimate_route_with_rate(&cycle.pools, &cycle.start_token, amount_in, native_rate, chain_id, cfg)
        else {
            continue;
        };
        match &best {
            Some(current) if candidate.net_pnl_bps <= current.net_pnl_bps => {}
            _ => best = Some(candidate),
        }
    }
    best
}
