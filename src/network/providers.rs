//! Provider interfaces for third-party market and risk data

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use crate::{
    errors::{EngineError, EngineResult},
    types::{PoolQuote, SecurityReport},
};

/// Pool and price lookups by token address.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Pools trading any of `tokens` on `chain_id`, optionally only those
    /// paired with `quote`. Unknown tokens yield no entries.
    async fn pools_for_tokens(
        &self,
        chain_id: &str,
        tokens: &[String],
        quote: Option<&str>,
    ) -> EngineResult<Vec<PoolQuote>>;
}

/// Token risk lookups keyed by lower-cased address.
#[async_trait]
pub trait SecurityProvider: Send + Sync {
    async fn security_reports(
        &self,
        chain_id: &str,
        addresses: &[String],
    ) -> EngineResult<HashMap<String, SecurityReport>>;
}

pub(crate) fn request_error(err: reqwest::Error, context: &str, timeout: Duration) -> EngineError {
    if err.is_timeout() {
        EngineError::Timeout {
            context: context.to_string(),
            timeout,
        }
    } else {
        EngineError::Network {
            message: format!("{}: {}", context, err),
            source: Some(err),
        }
    }
}

/// Errors while reading a response body; a timeout here is still a timeout.
pub(crate) fn body_error(err: reqwest::Error, context: &str, timeout: Duration) -> EngineError {
    if err.is_timeout() {
        return request_error(err, context, timeout);
    }
    EngineError::DataParsing {
        context: context.to_string(),
        source: err.into(),
    }
}

/// Runs `fetch` over fixed-size chunks of `addresses`, pausing `delay` between calls.
///
/// A failed chunk contributes nothing and the remaining chunks still run.
/// Only when every chunk fails is the last error returned.
pub(crate) async fn fetch_in_batches<T, F, Fut>(
    addresses: &[String],
    batch_size: usize,
    delay: Duration,
    context: &str,
    mut fetch: F,
) -> EngineResult<Vec<T>>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = EngineResult<Vec<T>>>,
{
    let mut collected = Vec::new();
    let mut succeeded = 0usize;
    let mut last_error = None;

    for (index, batch) in addresses.chunks(batch_size.max(1)).enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match fetch(batch.to_vec()).await {
            Ok(items) => {
                debug!(context, batch = index, items = items.len(), "batch fetched");
                succeeded += 1;
                collected.extend(items);
            }
            Err(e) => {
                warn!(context, batch = index, error = %e, "batch failed, skipping");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if succeeded == 0 => Err(e),
        _ => Ok(collected),
    }
}
