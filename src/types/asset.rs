//! Asset candidate types produced by discovery

use serde::{Deserialize, Serialize};
use super::Pool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCandidate {
    pub trace_id: String,
    pub chain_id: String,
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    /// 0-100 safety score, higher is safer.
    pub score: u8,
    pub flags: Vec<String>,
    pub pools: Vec<Pool>,
    pub dexes: Vec<String>,
}

impl AssetCandidate {
    pub fn summary(&self) -> AssetSummary {
        AssetSummary {
            chain_id: self.chain_id.clone(),
            address: self.address.clone(),
            symbol: self.symbol.clone(),
            score: self.score,
            pool_count: self.pools.len(),
        }
    }

    /// Copy with the address and every pool token lower-cased.
    ///
    /// Providers and callers may hand over checksummed addresses; routing
    /// compares tokens by string. The trace id is kept as given.
    pub fn normalized(&self) -> AssetCandidate {
        AssetCandidate {
            address: self.address.to_lowercase(),
            pools: self.pools.iter().map(Pool::normalized).collect(),
            ..self.clone()
        }
    }
}

/// `"{chain_id}:{address}"`, address lower-cased so the id is stable across sources.
///
/// Ids built by hand from a checksummed address are accepted too; compare
/// with [`same_trace_id`].
pub fn trace_id(chain_id: &str, address: &str) -> String {
    format!("{}:{}", chain_id, address.to_lowercase())
}

/// Trace ids match when the chain agrees exactly and the address agrees ignoring case.
pub fn same_trace_id(a: &str, b: &str) -> bool {
    match (a.split_once(':'), b.split_once(':')) {
        (Some((chain_a, addr_a)), Some((chain_b, addr_b))) => {
            chain_a == chain_b && addr_a.eq_ignore_ascii_case(addr_b)
        }
        _ => a == b,
    }
}

/// Compact asset view carried in audit events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub chain_id: String,
    pub address: String,
    pub symbol: String,
    pub score: u8,
    pub pool_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub score: u8,
    pub flags: Vec<String>,
}
