//! The six validation stages
//!
//! Every stage is a pure function of its inputs and returns a
//! `ValidationResult`; none of them log to the audit trail.

use rust_decimal::Decimal;
use serde_json::json;
use crate::{
    config::{PolicyConfig, ValidatorConfig},
    types::{AssetCandidate, CandidatePair, PairPlan, RejectionReason, ValidationResult, quote_tokens},
};

/// Stage 1: chain known and enabled, and the asset trades on one of its DEXs.
pub fn check_pre_config(asset: &AssetCandidate, config: &ValidatorConfig) -> ValidationResult {
    let Some(chain) = config.chains.get(&asset.chain_id) else {
        return ValidationResult::reject(
            RejectionReason::NotConfigured,
            format!("chain {} is not configured", asset.chain_id),
        );
    };
    if !chain.enabled {
        return ValidationResult::reject(
            RejectionReason::NotConfigured,
            format!("chain {} is disabled", asset.chain_id),
        );
    }

    let active: Vec<&str> = asset
        .dexes
        .iter()
        .filter(|dex| chain.dexes.contains(*dex))
        .map(String::as_str)
        .collect();
    if active.is_empty() {
        return ValidationResult::reject_with(
            RejectionReason::NotConfigured,
            format!("no active DEX on {} for this asset", asset.chain_id),
            json!({ "asset_dexes": asset.dexes, "chain_dexes": chain.dexes }),
        );
    }
    ValidationResult::pass_with(json!({ "active_dexes": active }))
}

/// Stage 2: at least one pool at or above the TVL floor.
pub fn check_liquidity(asset: &AssetCandidate, policy: &PolicyConfig) -> ValidationResult {
    let deepest = asset.pools.iter().map(|p| p.liquidity_usd).max();
    match deepest {
        Some(tvl) if tvl >= policy.tvl_min_usd => {
            ValidationResult::pass_with(json!({ "max_liquidity_usd": tvl }))
        }
        _ => ValidationResult::reject_with(
            RejectionReason::LowLiq,
            format!("no pool with liquidity >= {} USD", policy.tvl_min_usd),
            json!({ "max_liquidity_usd": deepest.unwrap_or(Decimal::ZERO), "pool_count": asset.pools.len() }),
        ),
    }
}

/// Stage 3: safety score at or above the floor.
pub fn check_safety_score(asset: &AssetCandidate, policy: &PolicyConfig) -> ValidationResult {
    if asset.score >= policy.min_safety_score {
        return ValidationResult::pass();
    }
    ValidationResult::reject_with(
        RejectionReason::LowScore,
        format!("safety score {} below {}", asset.score, policy.min_safety_score),
        json!({ "score": asset.score, "flags": asset.flags }),
    )
}

/// The asset paired against each allowlisted quote on its chain, itself excluded.
pub fn candidate_pairs(asset: &AssetCandidate) -> Vec<CandidatePair> {
    let base = asset.address.to_lowercase();
    quote_tokens(&asset.chain_id)
        .iter()
        .filter(|quote| !quote.address.eq_ignore_ascii_case(&base))
        .map(|quote| CandidatePair {
            base: base.clone(),
            quote: quote.address.to_string(),
            quote_symbol: quote.symbol.to_string(),
        })
        .collect()
}

/// Stage 4: at least one candidate pair.
pub fn check_pair_generation(pairs: &[CandidatePair]) -> ValidationResult {
    if pairs.is_empty() {
        return ValidationResult::reject(RejectionReason::NoPairs, "no quote token to pair against");
    }
    let quotes: Vec<&str> = pairs.iter().map(|p| p.quote_symbol.as_str()).collect();
    ValidationResult::pass_with(json!({ "pairs": quotes }))
}

/// Stage 5: at least one plan clears the ROI floor.
pub fn check_profit_precheck(plans: &[PairPlan], policy: &PolicyConfig) -> ValidationResult {
    let best = plans.iter().filter_map(|p| p.est_profit_bps).max();
    let profitable = plans.iter().filter(|p| p.is_profitable(policy.roi_min_bps)).count();

    if profitable == 0 {
        return ValidationResult::reject_with(
            RejectionReason::NoProfit,
            format!("no plan reaches {} bps", policy.roi_min_bps),
            json!({ "plans": plans.len(), "best_profit_bps": best }),
        );
    }
    ValidationResult::pass_with(json!({ "profitable_plans": profitable, "best_profit_bps": best }))
}

/// Structural problems that keep a plan from executing as one atomic bundle.
pub fn atomicity_violations(plan: &PairPlan, config: &ValidatorConfig) -> Vec<String> {
    let policy = &config.policy;
    let mut reasons = Vec::new();

    if plan.hops < policy.min_hops || plan.hops > policy.max_hops {
        reasons.push(format!("HOPS_INVALID:{}", plan.hops));
    }
    if plan.route.len() != plan.hops {
        reasons.push("ROUTE_MISMATCH".to_string());
    }
    if plan.pools_used.len() < plan.hops {
        reasons.push("POOLS_MISSING".to_string());
    }

    let mut unsupported: Vec<&str> = Vec::new();
    for dex in &plan.route {
        if !config.supported_dexes.contains(dex) && !unsupported.contains(&dex.as_str()) {
            unsupported.push(dex);
        }
    }
    if !unsupported.is_empty() {
        reasons.push(format!("DEX_UNSUPPORTED:{}", unsupported.join(",")));
    }
    reasons
}

/// Stage 6: annotates every profitable plan and passes if any is atomic.
///
/// Returned plans are copies of `plans` with `atomic` set and violations
/// appended to `reasons_block`; unprofitable plans are returned unchanged.
pub fn check_atomicity(plans: &[PairPlan], config: &ValidatorConfig) -> (Vec<PairPlan>, ValidationResult) {
    let mut annotated = Vec::with_capacity(plans.len());
    let mut atomic_count = 0usize;
    let mut profitable_count = 0usize;

    for plan in plans {
        let mut plan = plan.clone();
        if plan.is_profitable(config.policy.roi_min_bps) {
            profitable_count += 1;
            let violations = atomicity_violations(&plan, config);
            plan.atomic = violations.is_empty();
            plan.reasons_block.extend(violations);
            if plan.atomic {
                atomic_count += 1;
            }
        }
        annotated.push(plan);
    }

    let result = if atomic_count > 0 {
        ValidationResult::pass_with(json!({ "atomic_plans": atomic_count, "profitable_plans": profitable_count }))
    } else {
        let blocked: Vec<&Vec<String>> = annotated
            .iter()
            .filter(|p| p.is_profitable(config.policy.roi_min_bps))
            .map(|p| &p.reasons_block)
            .collect();
        ValidationResult::reject_with(
            RejectionReason::NotAtomic,
            "no profitable plan can execute atomically",
            json!({ "profitable_plans": profitable_count, "reasons": blocked }),
        )
    };
    (annotated, result)
}
