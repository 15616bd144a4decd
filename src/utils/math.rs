//! Checked decimal helpers
//!
//! Every helper returns `None` instead of a sentinel when the result would be
//! undefined (division by zero) or would overflow, so callers can discard the
//! value rather than carry a bogus number forward.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

pub const BPS_DENOMINATOR: Decimal = dec!(10000);
pub const GWEI: Decimal = dec!(0.000000001);

/// `delta / base` expressed in basis points.
pub fn to_bps(delta: Decimal, base: Decimal) -> Option<Decimal> {
    delta.checked_div(base)?.checked_mul(BPS_DENOMINATOR)
}

pub fn from_bps(bps: u32) -> Decimal {
    Decimal::from(bps) / BPS_DENOMINATOR
}

/// Native-token cost of `gas_units` at `gas_price_gwei`.
pub fn gas_cost_native(gas_units: u64, gas_price_gwei: Decimal) -> Option<Decimal> {
    Decimal::from(gas_units)
        .checked_mul(gas_price_gwei)?
        .checked_mul(GWEI)
}

/// Accepts only finite floats from external data.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}
