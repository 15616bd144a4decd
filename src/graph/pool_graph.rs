//! Token adjacency built from a flat pool list

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use crate::types::Pool;

/// `token -> neighbors` plus the parallel pools behind every token pair.
///
/// Ordered maps keep enumeration deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct PoolGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
    pairs: BTreeMap<String, Vec<Pool>>,
}

/// Tokens sorted lexicographically and joined.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}-{}", a, b)
    } else {
        format!("{}-{}", b, a)
    }
}

impl PoolGraph {
    pub fn build(pools: &[Pool]) -> Self {
        let mut graph = Self::default();
        for pool in pools {
            graph.insert(pool.clone());
        }
        graph
    }

    fn insert(&mut self, pool: Pool) {
        self.adjacency
            .entry(pool.token0.clone())
            .or_default()
            .insert(pool.token1.clone());
        self.adjacency
            .entry(pool.token1.clone())
            .or_default()
            .insert(pool.token0.clone());
        self.pairs
            .entry(pair_key(&pool.token0, &pool.token1))
            .or_default()
            .push(pool);
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn neighbors(&self, token: &str) -> Option<&BTreeSet<String>> {
        self.adjacency.get(token)
    }

    pub fn pools_between(&self, a: &str, b: &str) -> &[Pool] {
        self.pairs
            .get(&pair_key(a, b))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &[Pool])> {
        self.pairs.iter().map(|(key, pools)| (key.as_str(), pools.as_slice()))
    }

    /// Deepest pool for a pair; the first inserted wins ties.
    pub fn deepest_pool(&self, a: &str, b: &str) -> Option<&Pool> {
        self.pools_between(a, b)
            .iter()
            .fold(None, |best: Option<&Pool>, pool| match best {
                Some(current) if current.liquidity_usd >= pool.liquidity_usd => Some(current),
                _ => Some(pool),
            })
    }

    /// Units of `to` one unit of `from` is worth at the deepest direct pool's mid price.
    ///
    /// `None` when the tokens share no pool or the price is not positive.
    pub fn conversion_rate(&self, from: &str, to: &str) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        let pool = self.deepest_pool(from, to)?;
        if pool.price <= Decimal::ZERO {
            return None;
        }
        if pool.token0 == from {
            Some(pool.price)
        } else {
            Decimal::ONE.checked_div(pool.price)
        }
    }

    pub fn token_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pairs.values().map(Vec::len).sum()
    }
}
