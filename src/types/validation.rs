//! Validation result types

use serde::{Deserialize, Serialize};
use std::fmt;
use super::{AssetCandidate, PairPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    NotConfigured,
    LowLiq,
    LowScore,
    NoPairs,
    NoProfit,
    NotAtomic,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NotConfigured => "NOT_CONFIGURED",
            RejectionReason::LowLiq => "LOW_LIQ",
            RejectionReason::LowScore => "LOW_SCORE",
            RejectionReason::NoPairs => "NO_PAIRS",
            RejectionReason::NoProfit => "NO_PROFIT",
            RejectionReason::NotAtomic => "NOT_ATOMIC",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged outcome of one stage or of the whole pipeline. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ValidationResult {
    pub fn pass() -> Self {
        Self { valid: true, reason: None, message: None, data: None }
    }

    pub fn pass_with(data: serde_json::Value) -> Self {
        Self { valid: true, reason: None, message: None, data: Some(data) }
    }

    pub fn reject(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self { valid: false, reason: Some(reason), message: Some(message.into()), data: None }
    }

    pub fn reject_with(reason: RejectionReason, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self { valid: false, reason: Some(reason), message: Some(message.into()), data: Some(data) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PreConfig = 1,
    Liquidity = 2,
    SafetyScore = 3,
    PairGeneration = 4,
    ProfitPrecheck = 5,
    Atomicity = 6,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::PreConfig,
        Stage::Liquidity,
        Stage::SafetyScore,
        Stage::PairGeneration,
        Stage::ProfitPrecheck,
        Stage::Atomicity,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }
}

/// Pipeline output: the asset, its overall result, and the plans built for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetWithValidation {
    pub asset: AssetCandidate,
    pub validation: ValidationResult,
    pub pair_plans: Vec<PairPlan>,
    pub stages_passed: Vec<Stage>,
}

impl AssetWithValidation {
    pub fn is_approved(&self) -> bool {
        self.validation.valid
    }

    /// Plans that are profitable and passed the atomicity checks.
    pub fn tradable_plans(&self) -> impl Iterator<Item = &PairPlan> {
        self.pair_plans.iter().filter(|plan| plan.atomic)
    }
}
