//! Audit trail types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{AssetSummary, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOp {
    Discover,
    Validate,
    Approve,
    Reject,
    GeneratePairs,
    AddToTrading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub ts: DateTime<Utc>,
    pub trace_id: String,
    pub op: AuditOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ValidationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuditEvent {
    pub fn new(trace_id: impl Into<String>, op: AuditOp) -> Self {
        Self {
            ts: Utc::now(),
            trace_id: trace_id.into(),
            op,
            asset: None,
            result: None,
            reason: None,
        }
    }

    pub fn with_asset(mut self, asset: AssetSummary) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn with_result(mut self, result: ValidationResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
