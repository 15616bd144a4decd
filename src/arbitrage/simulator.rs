//! Per-hop swap simulation
//!
//! The price-impact factor is a fixed conservative constant, not a
//! constant-product or concentrated-liquidity model. It does not scale with
//! trade size or pool depth; production sizing needs reserve-based AMM math.

use rust_decimal::prelude::*;
use crate::{
    config::PRICE_IMPACT_FACTOR,
    types::Pool,
    utils::from_bps,
};

/// Output of swapping `amount_in` of `token_in` through `pool`.
///
/// `None` when the pool does not hold `token_in`, the pool price is not
/// positive, the fee is 100% or more, or the arithmetic overflows.
pub fn simulate_swap(amount_in: Decimal, pool: &Pool, token_in: &str) -> Option<Decimal> {
    if amount_in.is_sign_negative() || pool.price <= Decimal::ZERO {
        return None;
    }
    let rate = if token_in == pool.token0 {
        pool.price
    } else if token_in == pool.token1 {
        Decimal::ONE.checked_div(pool.price)?
    } else {
        return None;
    };
    let fee_factor = Decimal::ONE - from_bps(pool.fee_bps);
    if fee_factor <= Decimal::ZERO {
        return None;
    }
    amount_in
        .checked_mul(rate)?
        .checked_mul(fee_factor)?
        .checked_mul(PRICE_IMPACT_FACTOR)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedHop {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
}

/// Applies `simulate_swap` hop by hop, each output feeding the next input.
pub fn simulate_route(amount_in: Decimal, pools: &[Pool], start_token: &str) -> Option<Vec<SimulatedHop>> {
    let mut hops = Vec::with_capacity(pools.len());
    let mut carried_token = start_token.to_string();
    let mut carried_amount = amount_in;

    for pool in pools {
        let token_out = pool.other_token(&carried_token)?.to_string();
        let amount_out = simulate_swap(carried_amount, pool, &carried_token)?;
        hops.push(SimulatedHop {
            token_in: std::mem::replace(&mut carried_token, token_out.clone()),
            token_out,
            amount_in: carried_amount,
            amount_out,
        });
        carried_amount = amount_out;
    }
    Some(hops)
}
