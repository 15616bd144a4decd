//! GoPlus token security lookups

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};
use crate::{
    config::{ProviderConfig, chain_spec},
    errors::{EngineError, EngineResult},
    network::providers::{SecurityProvider, body_error, fetch_in_batches, request_error},
    types::SecurityReport,
};

/// Score deduction per risk flag. A flag is raised when the field reads `"1"`.
const RISK_PENALTIES: &[(&str, u8)] = &[
    ("is_honeypot", 100),
    ("cannot_sell_all", 50),
    ("cannot_buy", 50),
    ("owner_change_balance", 40),
    ("selfdestruct", 30),
    ("hidden_owner", 25),
    ("is_blacklisted", 20),
    ("transfer_pausable", 20),
    ("is_mintable", 15),
    ("slippage_modifiable", 15),
    ("external_call", 10),
    ("is_proxy", 10),
    ("trading_cooldown", 10),
    ("is_anti_whale", 5),
];

#[derive(Debug, Deserialize)]
struct SecurityResponse {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<HashMap<String, HashMap<String, serde_json::Value>>>,
}

/// Flags raised in one token's field map and the resulting 0-100 score.
fn score_fields(fields: &HashMap<String, serde_json::Value>) -> SecurityReport {
    let mut flags = Vec::new();
    let mut penalty: u32 = 0;
    for (field, weight) in RISK_PENALTIES {
        if fields.get(*field).and_then(|v| v.as_str()) == Some("1") {
            flags.push(field.to_string());
            penalty += u32::from(*weight);
        }
    }
    SecurityReport {
        score: 100u32.saturating_sub(penalty) as u8,
        flags,
    }
}

pub struct GoPlusClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    batch_size: usize,
    batch_delay: Duration,
}

impl GoPlusClient {
    pub fn new(config: &ProviderConfig) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::Network {
                message: "Failed to build HTTP client".to_string(),
                source: Some(e),
            })?;

        Ok(Self {
            client,
            base_url: config.goplus_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            batch_size: config.batch_size,
            batch_delay: config.batch_delay,
        })
    }

    async fn fetch_batch(&self, evm_chain_id: u64, batch: &[String]) -> EngineResult<Vec<(String, SecurityReport)>> {
        let url = format!("{}/api/v1/token_security/{}", self.base_url, evm_chain_id);
        let response = self
            .client
            .get(&url)
            .query(&[("contract_addresses", batch.join(","))])
            .send()
            .await
            .map_err(|e| request_error(e, "goplus request", self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Network {
                message: format!("goplus returned {}", status),
                source: None,
            });
        }

        let body: SecurityResponse = response
            .json()
            .await
            .map_err(|e| body_error(e, "goplus token_security response", self.timeout))?;

        if body.code != 1 {
            return Err(EngineError::Network {
                message: format!(
                    "goplus error code {}: {}",
                    body.code,
                    body.message.unwrap_or_default()
                ),
                source: None,
            });
        }

        Ok(body
            .result
            .unwrap_or_default()
            .into_iter()
            .map(|(address, fields)| (address.to_lowercase(), score_fields(&fields)))
            .collect())
    }
}

#[async_trait]
impl SecurityProvider for GoPlusClient {
    async fn security_reports(
        &self,
        chain_id: &str,
        addresses: &[String],
    ) -> EngineResult<HashMap<String, SecurityReport>> {
        let Some(spec) = chain_spec(chain_id) else {
            warn!(chain = %chain_id, "no EVM chain id known, security data unavailable");
            return Ok(HashMap::new());
        };
        let evm_chain_id = spec.evm_chain_id;
        let addresses: Vec<String> = addresses.iter().map(|a| a.to_lowercase()).collect();

        let reports: HashMap<String, SecurityReport> =
            fetch_in_batches(&addresses, self.batch_size, self.batch_delay, "goplus", |batch| async move {
                self.fetch_batch(evm_chain_id, &batch).await
            })
            .await?
            .into_iter()
            .collect();

        info!(chain = %chain_id, requested = addresses.len(), found = reports.len(), "security reports fetched");
        Ok(reports)
    }
}
