//! Candidate circular routes over a pool graph

use std::collections::HashSet;
use tracing::debug;
use crate::{
    config::{MAX_CYCLE_HOPS, MAX_ROUTES_PER_START_TOKEN},
    graph::PoolGraph,
    types::Pool,
};

/// A closed route: `pools[0]` takes `start_token`, the last pool returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub start_token: String,
    pub pools: Vec<Pool>,
}

impl Cycle {
    pub fn legs(&self) -> usize {
        self.pools.len()
    }
}

pub struct CycleFinder<'g> {
    graph: &'g PoolGraph,
    anchor: Option<String>,
    max_routes_per_start: usize,
}

impl<'g> CycleFinder<'g> {
    pub fn new(graph: &'g PoolGraph) -> Self {
        Self {
            graph,
            anchor: None,
            max_routes_per_start: MAX_ROUTES_PER_START_TOKEN,
        }
    }

    /// Token routes should start from when they contain it, usually the wrapped native.
    pub fn with_anchor(mut self, anchor: Option<&str>) -> Self {
        self.anchor = anchor.map(str::to_string);
        self
    }

    pub fn with_route_cap(mut self, cap: usize) -> Self {
        self.max_routes_per_start = cap;
        self
    }

    /// 2-leg then 3-leg candidates.
    pub fn find_all(&self) -> Vec<Cycle> {
        let mut cycles = self.two_leg();
        cycles.extend(self.three_leg());
        cycles
    }

    /// Every ordered pair of parallel pools on different DEXs.
    pub fn two_leg(&self) -> Vec<Cycle> {
        let mut cycles = Vec::new();
        for (_, pools) in self.graph.pairs() {
            if pools.len() < 2 {
                continue;
            }
            for (i, first) in pools.iter().enumerate() {
                for (j, second) in pools.iter().enumerate() {
                    if i == j || first.dex_id == second.dex_id {
                        continue;
                    }
                    cycles.push(Cycle {
                        start_token: self.two_leg_start(first),
                        pools: vec![first.clone(), second.clone()],
                    });
                }
            }
        }
        debug!(count = cycles.len(), "2-leg candidates");
        cycles
    }

    fn two_leg_start(&self, pool: &Pool) -> String {
        match &self.anchor {
            Some(anchor) if pool.contains(anchor) => anchor.clone(),
            _ => pool.token0.clone().min(pool.token1.clone()),
        }
    }

    /// Triangles found by a bounded depth-first search from every token.
    ///
    /// Rotations of an already emitted triangle are dropped. The search from
    /// one start token stops after `max_routes_per_start` emitted routes, so
    /// the result is not guaranteed to be complete on dense graphs.
    ///
    /// Each hop uses the deepest pool for its token pair. Parallel pools on
    /// other DEXs are not enumerated here; `two_leg` covers those.
    pub fn three_leg(&self) -> Vec<Cycle> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut cycles = Vec::new();

        for start in self.graph.tokens() {
            let mut emitted = 0;
            let mut stack: Vec<Vec<&str>> = vec![vec![start]];

            while let Some(path) = stack.pop() {
                if emitted >= self.max_routes_per_start {
                    break;
                }
                let Some(&last) = path.last() else { continue };
                let Some(neighbors) = self.graph.neighbors(last) else { continue };

                if path.len() == MAX_CYCLE_HOPS {
                    if !neighbors.contains(start) {
                        continue;
                    }
                    if !seen.insert(rotation_key(&path)) {
                        continue;
                    }
                    if let Some(cycle) = self.close_cycle(&path) {
                        cycles.push(cycle);
                        emitted += 1;
                    }
                    continue;
                }

                // reversed so the smallest neighbor is explored first
                for next in neighbors.iter().rev() {
                    if !path.contains(&next.as_str()) {
                        let mut extended = path.clone();
                        extended.push(next.as_str());
                        stack.push(extended);
                    }
                }
            }
        }
        debug!(count = cycles.len(), "3-leg candidates");
        cycles
    }

    fn close_cycle(&self, path: &[&str]) -> Option<Cycle> {
        let offset = self
            .anchor
            .as_deref()
            .and_then(|anchor| path.iter().position(|token| *token == anchor))
            .unwrap_or(0);
        let tokens: Vec<&str> = path.iter().cycle().skip(offset).take(path.len()).copied().collect();

        let mut pools = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let next = tokens[(i + 1) % tokens.len()];
            pools.push(self.graph.deepest_pool(token, next)?.clone());
        }
        Some(Cycle {
            start_token: tokens[0].to_string(),
            pools,
        })
    }
}

/// Direction-preserving key shared by every rotation of a token loop.
fn rotation_key(path: &[&str]) -> String {
    let start = path
        .iter()
        .enumerate()
        .min_by_key(|(_, token)| **token)
        .map(|(i, _)| i)
        .unwrap_or(0);
    path.iter()
        .cycle()
        .skip(start)
        .take(path.len())
        .copied()
        .collect::<Vec<_>>()
        .join(">")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::pool_graph::tests::pool;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn same_dex_parallel_pools_are_skipped() {
        let graph = PoolGraph::build(&[
            pool("uniswap", "0x1", "a", "b", dec!(1)),
            pool("uniswap", "0x2", "a", "b", dec!(1)),
        ]);
        assert!(CycleFinder::new(&graph).two_leg().is_empty());
    }

    #[test]
    fn cross_dex_pairs_are_emitted_in_both_orders() {
        let graph = PoolGraph::build(&[
            pool("uniswap", "0x1", "weth", "usdc", dec!(2000)),
            pool("sushiswap", "0x2", "weth", "usdc", dec!(2040)),
        ]);
        let cycles = CycleFinder::new(&graph).with_anchor(Some("weth")).two_leg();

        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().all(|c| c.start_token == "weth" && c.legs() == 2));
        assert_eq!(cycles[0].pools[0].pair_address, "0x1");
        assert_eq!(cycles[1].pools[0].pair_address, "0x2");
    }

    #[test]
    fn two_leg_start_defaults_to_smallest_token() {
        let graph = PoolGraph::build(&[
            pool("uniswap", "0x1", "weth", "usdc", dec!(2000)),
            pool("sushiswap", "0x2", "weth", "usdc", dec!(2040)),
        ]);
        let cycles = CycleFinder::new(&graph).two_leg();
        assert!(cycles.iter().all(|c| c.start_token == "usdc"));
    }

    #[test]
    fn triangle_is_found_once_per_direction() {
        let graph = PoolGraph::build(&[
            pool("uniswap", "0x1", "a", "b", dec!(1)),
            pool("uniswap", "0x2", "b", "c", dec!(1)),
            pool("uniswap", "0x3", "c", "a", dec!(1)),
        ]);
        let cycles = CycleFinder::new(&graph).three_leg();

        assert_eq!(cycles.len(), 2);
        let first: Vec<&str> = cycles[0].pools.iter().map(|p| p.pair_address.as_str()).collect();
        assert_eq!(first, vec!["0x1", "0x2", "0x3"]);
        assert_eq!(cycles[0].start_token, "a");
        assert!(cycles.iter().all(|c| c.legs() == 3));
    }

    #[test]
    fn triangle_rotation_starts_at_anchor() {
        let graph = PoolGraph::build(&[
            pool("uniswap", "0x1", "a", "b", dec!(1)),
            pool("uniswap", "0x2", "b", "c", dec!(1)),
            pool("uniswap", "0x3", "c", "a", dec!(1)),
        ]);
        let cycles = CycleFinder::new(&graph).with_anchor(Some("c")).three_leg();

        assert!(cycles.iter().all(|c| c.start_token == "c"));
        assert!(cycles[0].pools[0].contains("c"));
    }

    #[test]
    fn triangle_hops_take_the_deepest_parallel_pool() {
        let mut shallow = pool("sushiswap", "0x4", "a", "b", dec!(1.1));
        shallow.liquidity_usd = dec!(10);
        let graph = PoolGraph::build(&[
            pool("uniswap", "0x1", "a", "b", dec!(1)),
            shallow,
            pool("uniswap", "0x2", "b", "c", dec!(1)),
            pool("uniswap", "0x3", "c", "a", dec!(1)),
        ]);
        let cycles = CycleFinder::new(&graph).three_leg();

        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().all(|c| c.pools.iter().all(|p| p.pair_address != "0x4")));
    }

    #[test]
    fn open_paths_produce_no_triangles() {
        let graph = PoolGraph::build(&[
            pool("uniswap", "0x1", "a", "b", dec!(1)),
            pool("uniswap", "0x2", "b", "c", dec!(1)),
            pool("uniswap", "0x3", "c", "d", dec!(1)),
        ]);
        assert!(CycleFinder::new(&graph).three_leg().is_empty());
    }

    #[test]
    fn route_cap_bounds_each_start_token() {
        // complete graph on 6 tokens has 20 directed triangles through "t0"
        let tokens = ["t0", "t1", "t2", "t3", "t4", "t5"];
        let mut pools = Vec::new();
        for (i, a) in tokens.iter().enumerate() {
            for b in &tokens[i + 1..] {
                pools.push(pool("uniswap", &format!("{}{}", a, b), a, b, dec!(1)));
            }
        }
        let graph = PoolGraph::build(&pools);
        let cycles = CycleFinder::new(&graph).with_route_cap(10).three_leg();
        let from_t0 = cycles.iter().filter(|c| c.start_token == "t0").count();

        assert_eq!(from_t0, 10);
        assert!(cycles.len() <= 10 * tokens.len());
    }

    proptest! {
        #[test]
        fn two_leg_routes_never_share_a_dex(
            specs in proptest::collection::vec((0usize..3, 0usize..4, 0usize..4), 1..24)
        ) {
            let dexes = ["uniswap", "sushiswap", "curve"];
            let tokens = ["a", "b", "c", "d"];
            let pools: Vec<Pool> = specs
                .iter()
                .enumerate()
                .filter(|(_, (_, t0, t1))| t0 != t1)
                .map(|(i, (dex, t0, t1))| pool(dexes[*dex], &format!("0x{}", i), tokens[*t0], tokens[*t1], dec!(1)))
                .collect();
            let graph = PoolGraph::build(&pools);

            for cycle in CycleFinder::new(&graph).two_leg() {
                prop_assert_eq!(cycle.legs(), 2);
                prop_assert_ne!(&cycle.pools[0].dex_id, &cycle.pools[1].dex_id);
            }
        }
    }
}
