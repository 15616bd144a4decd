//! DexScreener pool lookups

use async_trait::async_trait;
use rust_decimal::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use crate::{
    config::ProviderConfig,
    errors::{EngineError, EngineResult},
    network::providers::{PriceProvider, body_error, fetch_in_batches, request_error},
    types::PoolQuote,
    utils::decimal_from_f64,
};

#[derive(Debug, Deserialize)]
struct TokensResponse {
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPair {
    chain_id: String,
    dex_id: String,
    pair_address: String,
    base_token: DexToken,
    quote_token: DexToken,
    price_native: Option<String>,
    liquidity: Option<DexLiquidity>,
    volume: Option<DexVolume>,
}

#[derive(Debug, Deserialize)]
struct DexToken {
    address: String,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct DexLiquidity {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DexVolume {
    h24: Option<f64>,
}

impl DexPair {
    /// `None` when price or liquidity is missing or non-finite. Missing volume reads as zero.
    fn into_quote(self) -> Option<PoolQuote> {
        let price_native = Decimal::from_str(self.price_native?.trim()).ok()?;
        if price_native <= Decimal::ZERO {
            return None;
        }
        let liquidity_usd = decimal_from_f64(self.liquidity?.usd?)?;
        // new pools often have no 24h volume yet
        let volume_24h = self
            .volume
            .and_then(|v| v.h24)
            .and_then(decimal_from_f64)
            .unwrap_or(Decimal::ZERO);

        Some(PoolQuote {
            chain_id: self.chain_id,
            dex_id: self.dex_id,
            pool_address: self.pair_address.to_lowercase(),
            base_address: self.base_token.address.to_lowercase(),
            base_symbol: self.base_token.symbol,
            quote_address: self.quote_token.address.to_lowercase(),
            quote_symbol: self.quote_token.symbol,
            liquidity_usd,
            volume_24h,
            price_native,
        })
    }
}

pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    batch_size: usize,
    batch_delay: Duration,
}

impl DexScreenerClient {
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
            base_url: config.dexscreener_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            batch_size: config.batch_size,
            batch_delay: config.batch_delay,
        })
    }

    async fn fetch_batch(&self, batch: &[String]) -> EngineResult<Vec<PoolQuote>> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, batch.join(","));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(e, "dexscreener request", self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Network {
                message: format!("dexscreener returned {}", status),
                source: None,
            });
        }

        let body: TokensResponse = response
            .json()
            .await
            .map_err(|e| body_error(e, "dexscreener tokens response", self.timeout))?;

        let pairs = body.pairs.unwrap_or_default();
        let total = pairs.len();
        let quotes: Vec<PoolQuote> = pairs.into_iter().filter_map(DexPair::into_quote).collect();
        if quotes.len() < total {
            debug!(dropped = total - quotes.len(), "pairs with incomplete data skipped");
        }
        Ok(quotes)
    }
}

#[async_trait]
impl PriceProvider for DexScreenerClient {
    async fn pools_for_tokens(
        &self,
        chain_id: &str,
        tokens: &[String],
        quote: Option<&str>,
    ) -> EngineResult<Vec<PoolQuote>> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let quote = quote.map(str::to_lowercase);

        let fetched = fetch_in_batches(&tokens, self.batch_size, self.batch_delay, "dexscreener", |batch| async move {
            self.fetch_batch(&batch).await
        })
        .await?;

        let mut seen = HashSet::new();
        let quotes: Vec<PoolQuote> = fetched
            .into_iter()
            .filter(|q| q.chain_id == chain_id)
            .filter(|q| match &quote {
                Some(quote) => q.quote_address == *quote || q.base_address == *quote,
                None => true,
            })
            .filter(|q| seen.insert(q.pool_address.clone()))
            .collect();

        info!(chain = %chain_id, tokens = tokens.len(), pools = quotes.len(), "dexscreener pools fetched");
        Ok(quotes)
    }
}
