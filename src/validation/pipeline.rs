//! Six-stage asset validation with an audit trail

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use crate::{
    config::ValidatorConfig,
    errors::ValidationError,
    storage::AuditSink,
    types::{
        AssetCandidate, AssetWithValidation, AuditEvent, AuditOp, PairPlan, Pool, Stage,
        ValidationResult, same_trace_id, trace_id,
    },
    validation::{
        build_pair_plans, candidate_pairs, check_atomicity, check_liquidity,
        check_pair_generation, check_pre_config, check_profit_precheck, check_safety_score,
    },
};

pub const INTERNAL_ERROR_REASON: &str = "INTERNAL_ERROR";
pub const NOT_APPROVED_REASON: &str = "NOT_APPROVED";

/// Runs assets through the validation stages, recording each step in the audit sink.
///
/// Stage logic is pure; the sink is the only shared state, so one validator
/// can serve concurrent validations of different assets.
#[derive(Clone)]
pub struct AssetValidator {
    sink: Arc<dyn AuditSink>,
}

impl AssetValidator {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<dyn AuditSink> {
        &self.sink
    }

    fn record(&self, event: AuditEvent) -> Result<(), ValidationError> {
        self.sink.append(&event).map_err(|source| ValidationError::Audit {
            trace_id: event.trace_id.clone(),
            source,
        })
    }

    fn reject(&self, asset: &AssetCandidate, result: &ValidationResult) -> Result<(), ValidationError> {
        let reason = result.reason.map(|r| r.as_str()).unwrap_or(INTERNAL_ERROR_REASON);
        self.record(
            AuditEvent::new(&asset.trace_id, AuditOp::Reject)
                .with_asset(asset.summary())
                .with_result(result.clone())
                .with_reason(reason),
        )
    }

    pub fn discover(&self, asset: &AssetCandidate) -> Result<(), ValidationError> {
        info!(trace_id = %asset.trace_id, symbol = %asset.symbol, pools = asset.pools.len(), "asset discovered");
        self.record(AuditEvent::new(&asset.trace_id, AuditOp::Discover).with_asset(asset.summary()))
    }

    /// Validates `asset` against `config`.
    ///
    /// A rule rejection is `Ok` with `validation.valid == false`. `Err` means
    /// the input was malformed or the audit trail could not be written.
    /// `bridge_pools` are quote-to-quote pools used to close three-hop plans.
    pub fn run_full_pipeline(
        &self,
        asset: &AssetCandidate,
        config: &ValidatorConfig,
        bridge_pools: &[Pool],
    ) -> Result<AssetWithValidation, ValidationError> {
        if let Err(message) = check_well_formed(asset) {
            return Err(self.internal_fault(asset, message));
        }
        let normalized = asset.normalized();
        let bridge_pools: Vec<Pool> = bridge_pools.iter().map(Pool::normalized).collect();

        self.record(AuditEvent::new(&asset.trace_id, AuditOp::Validate).with_asset(asset.summary()))?;

        let mut stages_passed = Vec::with_capacity(Stage::ALL.len());
        let outcome = |validation: ValidationResult, pair_plans: Vec<PairPlan>, stages_passed: Vec<Stage>| {
            AssetWithValidation {
                asset: asset.clone(),
                validation,
                pair_plans,
                stages_passed,
            }
        };

        let asset_checks: [(Stage, &dyn Fn() -> ValidationResult); 3] = [
            (Stage::PreConfig, &|| check_pre_config(&normalized, config)),
            (Stage::Liquidity, &|| check_liquidity(&normalized, &config.policy)),
            (Stage::SafetyScore, &|| check_safety_score(&normalized, &config.policy)),
        ];
        for (stage, check) in asset_checks {
            let result = check();
            if !result.valid {
                return self.stop_at(stage, result, asset, Vec::new(), stages_passed, &outcome);
            }
            stages_passed.push(stage);
        }

        let pairs = candidate_pairs(&normalized);
        let result = check_pair_generation(&pairs);
        if !result.valid {
            return self.stop_at(Stage::PairGeneration, result, asset, Vec::new(), stages_passed, &outcome);
        }
        stages_passed.push(Stage::PairGeneration);

        let plans = build_pair_plans(&normalized, &pairs, &bridge_pools, &config.policy);
        self.record(
            AuditEvent::new(&asset.trace_id, AuditOp::GeneratePairs).with_result(ValidationResult::pass_with(
                json!({ "pairs": pairs.len(), "plans": plans.len() }),
            )),
        )?;
        debug!(trace_id = %asset.trace_id, pairs = pairs.len(), plans = plans.len(), "pair plans built");

        let result = check_profit_precheck(&plans, &config.policy);
        if !result.valid {
            return self.stop_at(Stage::ProfitPrecheck, result, asset, plans, stages_passed, &outcome);
        }
        stages_passed.push(Stage::ProfitPrecheck);

        let (plans, result) = check_atomicity(&plans, config);
        if !result.valid {
            return self.stop_at(Stage::Atomicity, result, asset, plans, stages_passed, &outcome);
        }
        stages_passed.push(Stage::Atomicity);

        let tradable = plans.iter().filter(|p| p.atomic).count();
        let best = plans.iter().filter(|p| p.atomic).filter_map(|p| p.est_profit_bps).max();
        let approved = ValidationResult::pass_with(json!({ "tradable_plans": tradable, "best_profit_bps": best }));
        self.record(
            AuditEvent::new(&asset.trace_id, AuditOp::Approve)
                .with_asset(asset.summary())
                .with_result(approved.clone()),
        )?;

        info!(trace_id = %asset.trace_id, tradable_plans = tradable, "asset approved");
        Ok(outcome(approved, plans, stages_passed))
    }

    fn stop_at<F>(
        &self,
        stage: Stage,
        result: ValidationResult,
        asset: &AssetCandidate,
        plans: Vec<PairPlan>,
        stages_passed: Vec<Stage>,
        outcome: &F,
    ) -> Result<AssetWithValidation, ValidationError>
    where
        F: Fn(ValidationResult, Vec<PairPlan>, Vec<Stage>) -> AssetWithValidation,
    {
        info!(
            trace_id = %asset.trace_id,
            stage = stage.number(),
            reason = ?result.reason,
            message = result.message.as_deref().unwrap_or(""),
            "asset rejected"
        );
        self.reject(asset, &result)?;
        Ok(outcome(result, plans, stages_passed))
    }

    fn internal_fault(&self, asset: &AssetCandidate, message: String) -> ValidationError {
        let trace_id = if asset.trace_id.is_empty() {
            trace_id(&asset.chain_id, &asset.address)
        } else {
            asset.trace_id.clone()
        };
        error!(trace_id = %trace_id, error = %message, "validation aborted on malformed input");

        let event = AuditEvent::new(&trace_id, AuditOp::Reject).with_reason(INTERNAL_ERROR_REASON);
        if let Err(e) = self.sink.append(&event) {
            warn!(trace_id = %trace_id, error = %e, "could not record internal error");
        }
        ValidationError::Fault { trace_id, message }
    }

    /// Hands an approved asset to trading; anything else is refused and audited.
    pub fn add_to_trading(&self, validated: &AssetWithValidation) -> Result<(), ValidationError> {
        let asset = &validated.asset;
        if !validated.is_approved() {
            warn!(trace_id = %asset.trace_id, "refusing to trade an unapproved asset");
            self.record(
                AuditEvent::new(&asset.trace_id, AuditOp::Reject)
                    .with_asset(asset.summary())
                    .with_result(validated.validation.clone())
                    .with_reason(NOT_APPROVED_REASON),
            )?;
            return Err(ValidationError::NotApproved {
                trace_id: asset.trace_id.clone(),
            });
        }

        self.record(AuditEvent::new(&asset.trace_id, AuditOp::AddToTrading).with_asset(asset.summary()))?;
        info!(trace_id = %asset.trace_id, plans = validated.tradable_plans().count(), "asset added to trading");
        Ok(())
    }
}

/// Input checks that separate caller bugs from rule rejections.
fn check_well_formed(asset: &AssetCandidate) -> Result<(), String> {
    if asset.trace_id.is_empty() {
        return Err("empty trace id".to_string());
    }
    let expected = trace_id(&asset.chain_id, &asset.address);
    if !same_trace_id(&asset.trace_id, &expected) {
        return Err(format!("trace id {} does not match {}", asset.trace_id, expected));
    }
    if let Some(pool) = asset.pools.iter().find(|p| p.token0.is_empty() || p.token1.is_empty()) {
        return Err(format!("pool {} has a missing token", pool.pair_address));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonlAuditLog, MemoryAuditLog};
    use crate::types::{RejectionReason, USDC_BASE};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn validator() -> (AssetValidator, Arc<MemoryAuditLog>) {
        let log = Arc::new(MemoryAuditLog::new());
        (AssetValidator::new(log.clone()), log)
    }

    fn bare_asset() -> AssetCandidate {
        AssetCandidate {
            trace_id: "base:0xabc".to_string(),
            chain_id: "base".to_string(),
            address: "0xabc".to_string(),
            symbol: "ABC".to_string(),
            decimals: 18,
            score: 90,
            flags: vec![],
            pools: vec![],
            dexes: vec!["aerodrome".to_string()],
        }
    }

    #[test]
    fn malformed_trace_id_is_a_fault_not_a_rejection() {
        let (validator, log) = validator();
        let config = ValidatorConfig::with_active_chains(&["base".to_string()]);
        let mut asset = bare_asset();
        asset.trace_id = "base:0xother".to_string();

        let result = validator.run_full_pipeline(&asset, &config, &[]);

        assert!(matches!(result, Err(ValidationError::Fault { .. })));
        let events = log.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].op, AuditOp::Reject);
        assert_eq!(events[0].reason.as_deref(), Some(INTERNAL_ERROR_REASON));
    }

    #[test]
    fn empty_trace_id_falls_back_to_derived_id_for_the_audit() {
        let (validator, log) = validator();
        let config = ValidatorConfig::with_active_chains(&["base".to_string()]);
        let mut asset = bare_asset();
        asset.trace_id.clear();

        let result = validator.run_full_pipeline(&asset, &config, &[]);

        assert!(result.is_err());
        assert_eq!(log.events()[0].trace_id, "base:0xabc");
    }

    #[test]
    fn unapproved_asset_cannot_be_traded() {
        let (validator, log) = validator();
        let config = ValidatorConfig::with_active_chains(&["base".to_string()]);

        // no pools, so stage 2 rejects
        let validated = validator.run_full_pipeline(&bare_asset(), &config, &[]).unwrap();
        assert!(!validated.is_approved());
        assert_eq!(validated.stages_passed, vec![Stage::PreConfig]);

        let refused = validator.add_to_trading(&validated);
        assert!(matches!(refused, Err(ValidationError::NotApproved { .. })));
        let last = log.events().pop().unwrap();
        assert_eq!(last.op, AuditOp::Reject);
        assert_eq!(last.reason.as_deref(), Some(NOT_APPROVED_REASON));
    }

    const TOKEN: &str = "0x3333333333333333333333333333333333333333";

    fn base_pool(dex: &str, addr: &str, price: Decimal) -> Pool {
        Pool {
            chain_id: "base".to_string(),
            dex_id: dex.to_string(),
            pair_address: addr.to_string(),
            token0: TOKEN.to_string(),
            token1: USDC_BASE.to_string(),
            fee_bps: 30,
            liquidity_usd: dec!(2_500_000),
            price,
        }
    }

    /// TKN quoted 1.00 USDC on aerodrome and 1.05 on uniswap.
    fn mispriced_asset(score: u8) -> AssetCandidate {
        AssetCandidate {
            trace_id: format!("base:{}", TOKEN),
            chain_id: "base".to_string(),
            address: TOKEN.to_string(),
            symbol: "TKN".to_string(),
            decimals: 18,
            score,
            flags: vec![],
            pools: vec![
                base_pool("aerodrome", "0xpa", dec!(1.00)),
                base_pool("uniswap", "0xpu", dec!(1.05)),
            ],
            dexes: vec!["aerodrome".to_string(), "uniswap".to_string()],
        }
    }

    fn ops(log: &MemoryAuditLog) -> Vec<AuditOp> {
        log.events().iter().map(|e| e.op).collect()
    }

    #[test]
    fn low_score_writes_a_single_reject_and_builds_no_pairs() {
        let (validator, log) = validator();
        let config = ValidatorConfig::with_active_chains(&["base".to_string()]);

        let validated = validator.run_full_pipeline(&mispriced_asset(65), &config, &[]).unwrap();

        assert!(!validated.is_approved());
        assert_eq!(validated.validation.reason, Some(RejectionReason::LowScore));
        assert_eq!(validated.stages_passed, vec![Stage::PreConfig, Stage::Liquidity]);
        assert!(validated.pair_plans.is_empty());
        assert_eq!(ops(&log), vec![AuditOp::Validate, AuditOp::Reject]);
        assert_eq!(log.events()[1].reason.as_deref(), Some("LOW_SCORE"));
    }

    #[test]
    fn mispriced_asset_is_approved_and_tradable() {
        let (validator, log) = validator();
        let config = ValidatorConfig::with_active_chains(&["base".to_string()]);

        let validated = validator.run_full_pipeline(&mispriced_asset(85), &config, &[]).unwrap();

        assert!(validated.is_approved(), "{:?}", validated.validation);
        assert_eq!(validated.stages_passed, Stage::ALL.to_vec());
        assert_eq!(validated.pair_plans.len(), 2);

        let tradable: Vec<&PairPlan> = validated.tradable_plans().collect();
        assert_eq!(tradable.len(), 1);
        assert_eq!(tradable[0].route, vec!["aerodrome", "uniswap"]);
        assert!(tradable[0].est_profit_bps.unwrap() > dec!(300));
        assert_eq!(ops(&log), vec![AuditOp::Validate, AuditOp::GeneratePairs, AuditOp::Approve]);

        validator.add_to_trading(&validated).unwrap();
        assert_eq!(log.events().last().map(|e| e.op), Some(AuditOp::AddToTrading));
    }

    #[test]
    fn checksummed_addresses_validate_like_lowercase_ones() {
        const CHECKSUMMED: &str = "0xAbCdEf0000000000000000000000000000000001";
        const USDC_CHECKSUMMED: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
        let (validator, log) = validator();
        let config = ValidatorConfig::with_active_chains(&["base".to_string()]);

        let mut asset = mispriced_asset(85);
        asset.trace_id = format!("base:{}", CHECKSUMMED);
        asset.address = CHECKSUMMED.to_string();
        for pool in &mut asset.pools {
            pool.token0 = CHECKSUMMED.to_string();
            pool.token1 = USDC_CHECKSUMMED.to_string();
        }

        let validated = validator.run_full_pipeline(&asset, &config, &[]).unwrap();

        assert!(validated.is_approved(), "{:?}", validated.validation);
        assert_eq!(validated.tradable_plans().count(), 1);
        assert_eq!(validated.asset, asset);
        assert!(log.events().iter().all(|e| e.trace_id == asset.trace_id));
        assert_eq!(ops(&log), vec![AuditOp::Validate, AuditOp::GeneratePairs, AuditOp::Approve]);
    }

    #[test]
    fn repeated_runs_give_the_same_outcome() {
        let (validator, log) = validator();
        let config = ValidatorConfig::with_active_chains(&["base".to_string()]);
        let asset = mispriced_asset(85);

        let first = validator.run_full_pipeline(&asset, &config, &[]).unwrap();
        let second = validator.run_full_pipeline(&asset, &config, &[]).unwrap();

        assert_eq!(first, second);
        assert_eq!(log.events().len(), 6);
    }

    #[test]
    fn every_event_reaches_the_jsonl_trail() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(JsonlAuditLog::open(dir.path().join("audit.jsonl")).unwrap());
        let validator = AssetValidator::new(log.clone());
        let config = ValidatorConfig::with_active_chains(&["base".to_string()]);
        let asset = mispriced_asset(85);

        validator.discover(&asset).unwrap();
        validator.run_full_pipeline(&asset, &config, &[]).unwrap();

        let ops: Vec<AuditOp> = log.query(&asset.trace_id, 10).unwrap().iter().map(|e| e.op).collect();
        assert_eq!(
            ops,
            vec![AuditOp::Discover, AuditOp::Validate, AuditOp::GeneratePairs, AuditOp::Approve]
        );
    }
}
