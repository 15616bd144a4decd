//! Where each scan gets its pool snapshot from

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use crate::{
    config::dex_fee_bps,
    errors::{EngineError, EngineResult},
    network::PriceProvider,
    types::Pool,
};

#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Current pools on `chain_id`. An error aborts the whole scan.
    async fn snapshot(&self, chain_id: &str) -> EngineResult<Vec<Pool>>;
}

/// Fixed pool list, from memory or a JSON file.
#[derive(Debug, Clone, Default)]
pub struct StaticPoolSource {
    pools: Vec<Pool>,
}

impl StaticPoolSource {
    pub fn new(pools: Vec<Pool>) -> Self {
        Self { pools }
    }

    /// Reads a JSON array of pools.
    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| EngineError::DataParsing {
            context: format!("reading pools file {}", path.display()),
            source: e.into(),
        })?;
        let pools: Vec<Pool> = serde_json::from_str(&raw).map_err(|e| EngineError::DataParsing {
            context: format!("parsing pools file {}", path.display()),
            source: e.into(),
        })?;
        Ok(Self::new(pools))
    }
}

#[async_trait]
impl PoolSource for StaticPoolSource {
    async fn snapshot(&self, chain_id: &str) -> EngineResult<Vec<Pool>> {
        Ok(self
            .pools
            .iter()
            .filter(|p| p.chain_id == chain_id)
            .cloned()
            .collect())
    }
}

/// Live pools for a per-chain watch list, fetched through a price provider.
pub struct ProviderPoolSource {
    provider: Arc<dyn PriceProvider>,
    watch_tokens: HashMap<String, Vec<String>>,
}

impl ProviderPoolSource {
    pub fn new(provider: Arc<dyn PriceProvider>, watch_tokens: HashMap<String, Vec<String>>) -> Self {
        Self { provider, watch_tokens }
    }
}

#[async_trait]
impl PoolSource for ProviderPoolSource {
    async fn snapshot(&self, chain_id: &str) -> EngineResult<Vec<Pool>> {
        let Some(tokens) = self.watch_tokens.get(chain_id).filter(|t| !t.is_empty()) else {
            debug!(chain = %chain_id, "no watch tokens configured");
            return Ok(Vec::new());
        };

        let quotes = self.provider.pools_for_tokens(chain_id, tokens, None).await?;
        Ok(quotes
            .into_iter()
            .map(|quote| {
                let fee_bps = dex_fee_bps(&quote.dex_id);
                quote.into_pool(fee_bps)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::pool_graph::tests::pool;
    use crate::types::PoolQuote;
    use rust_decimal_macros::dec;
    use std::io::Write;

    struct FixedQuotes(Vec<PoolQuote>);

    #[async_trait]
    impl PriceProvider for FixedQuotes {
        async fn pools_for_tokens(&self, _: &str, _: &[String], _: Option<&str>) -> EngineResult<Vec<PoolQuote>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn static_source_filters_by_chain() {
        let mut other = pool("uniswap", "0x2", "a", "b", dec!(1));
        other.chain_id = "base".to_string();
        let source = StaticPoolSource::new(vec![pool("uniswap", "0x1", "a", "b", dec!(1)), other]);

        let pools = source.snapshot("ethereum").await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].pair_address, "0x1");
    }

    #[tokio::test]
    async fn static_source_loads_json_file() {
        let pools = vec![pool("uniswap", "0x1", "a", "b", dec!(1.5))];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&pools).unwrap()).unwrap();

        let source = StaticPoolSource::from_json_file(file.path()).unwrap();
        assert_eq!(source.snapshot("ethereum").await.unwrap(), pools);
    }

    #[test]
    fn malformed_pools_file_is_a_parsing_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let result = StaticPoolSource::from_json_file(file.path());
        assert!(matches!(result, Err(EngineError::DataParsing { .. })));
    }

    #[tokio::test]
    async fn provider_source_applies_dex_fees() {
        let quote = PoolQuote {
            chain_id: "base".to_string(),
            dex_id: "curve".to_string(),
            pool_address: "0xPOOL".to_string(),
            base_address: "0xA".to_string(),
            base_symbol: "A".to_string(),
            quote_address: "0xB".to_string(),
            quote_symbol: "B".to_string(),
            liquidity_usd: dec!(5_000_000),
            volume_24h: dec!(100),
            price_native: dec!(2),
        };
        let watch = HashMap::from([("base".to_string(), vec!["0xa".to_string()])]);
        let source = ProviderPoolSource::new(Arc::new(FixedQuotes(vec![quote])), watch);

        let pools = source.snapshot("base").await.unwrap();
        assert_eq!(pools[0].fee_bps, 4);
        assert_eq!(pools[0].token0, "0xa");
        assert_eq!(pools[0].pair_address, "0xpool");

        assert!(source.snapshot("ethereum").await.unwrap().is_empty());
    }
}
