//! Periodic opportunity scan across chains

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};
use crate::{
    arbitrage::best_over_ladder,
    config::ScannerConfig,
    graph::{CycleFinder, PoolGraph},
    scanner::{PoolSource, ScannerState},
    types::{ArbitrageRoute, Pool, wrapped_native},
};

#[derive(Debug)]
pub enum TickOutcome {
    /// Another scan was still running; this tick was dropped.
    Skipped,
    Completed(Vec<ArbitrageRoute>),
    Failed,
}

pub struct OpportunityScanner {
    config: ScannerConfig,
    source: Arc<dyn PoolSource>,
    state: Arc<ScannerState>,
}

impl OpportunityScanner {
    pub fn new(config: ScannerConfig, source: Arc<dyn PoolSource>, state: Arc<ScannerState>) -> Self {
        Self { config, source, state }
    }

    pub fn state(&self) -> &Arc<ScannerState> {
        &self.state
    }

    /// One scan over every configured chain, ranked by `net_pnl_bps` descending.
    pub async fn tick(&self) -> TickOutcome {
        let Some(_guard) = self.state.try_begin() else {
            debug!("scan still running, tick dropped");
            self.state.record_skipped();
            return TickOutcome::Skipped;
        };
        let started = Instant::now();

        let mut routes = Vec::new();
        for chain_id in &self.config.chains {
            let pools = match self.source.snapshot(chain_id).await {
                Ok(pools) => pools,
                Err(e) => {
                    error!(chain = %chain_id, error = %e, "pool snapshot failed, scan abandoned");
                    self.state.record_failed();
                    return TickOutcome::Failed;
                }
            };
            routes.extend(self.scan_chain(chain_id, &pools));
        }

        // stable, so equal scores keep discovery order
        routes.sort_by(|a, b| b.net_pnl_bps.cmp(&a.net_pnl_bps));
        self.state.record_completed(&routes).await;

        info!(
            chains = self.config.chains.len(),
            opportunities = routes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan completed"
        );
        TickOutcome::Completed(routes)
    }

    /// Candidate routes on one chain that pass the profit, gas and atomicity filters.
    ///
    /// Gas is priced in the start token through a direct pool with the
    /// chain's wrapped native token. Cycles whose start token has no such
    /// pool cannot be priced and are skipped.
    pub fn scan_chain(&self, chain_id: &str, pools: &[Pool]) -> Vec<ArbitrageRoute> {
        let anchor = wrapped_native(chain_id);
        let graph = PoolGraph::build(pools);
        let cycles = CycleFinder::new(&graph).with_anchor(anchor).find_all();

        let mut unpriced = 0usize;
        let mut routes = Vec::new();
        for cycle in &cycles {
            let Some(native_rate) = anchor.and_then(|a| graph.conversion_rate(a, &cycle.start_token)) else {
                unpriced += 1;
                continue;
            };
            if let Some(route) = best_over_ladder(cycle, native_rate, chain_id, &self.config.profit) {
                if self.passes_filters(&route) {
                    routes.push(route);
                }
            }
        }

        debug!(
            chain = %chain_id,
            tokens = graph.token_count(),
            pools = graph.pool_count(),
            cycles = cycles.len(),
            unpriced,
            routes = routes.len(),
            "chain scanned"
        );
        routes
    }

    fn passes_filters(&self, route: &ArbitrageRoute) -> bool {
        route.net_pnl_bps > self.config.profit.min_pnl_bps
            && route.gas_cost_eth < self.config.max_gas_cost_eth
            && route.atomic_safe
    }

    /// Ticks every `interval` until `shutdown` flips to true.
    ///
    /// Each tick runs on its own task, so a scan that outlives the interval
    /// makes the following ticks drop instead of queueing. Non-empty results
    /// are forwarded to `results`.
    pub async fn run(
        self: Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
        results: mpsc::UnboundedSender<Vec<ArbitrageRoute>>,
    ) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = self.config.interval.as_secs(), chains = ?self.config.chains, "scanner started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("scanner received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let scanner = Arc::clone(&self);
                    let results = results.clone();
                    tokio::spawn(async move {
                        if let TickOutcome::Completed(routes) = scanner.tick().await {
                            if !routes.is_empty() && results.send(routes).is_err() {
                                debug!("result receiver dropped");
                            }
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EngineError, EngineResult};
    use crate::graph::pool_graph::tests::pool;
    use crate::scanner::StaticPoolSource;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tokio::sync::Notify;

    const WETH: &str = crate::types::WETH_ETHEREUM;
    const USDC: &str = crate::types::USDC_ETHEREUM;
    const DAI: &str = crate::types::DAI_ETHEREUM;

    fn weth_usdc_gap() -> Vec<Pool> {
        vec![
            pool("uniswap", "0x1", WETH, USDC, dec!(2040)),
            pool("sushiswap", "0x2", WETH, USDC, dec!(2000)),
        ]
    }

    fn scanner_over(source: Arc<dyn PoolSource>) -> OpportunityScanner {
        OpportunityScanner::new(ScannerConfig::default(), source, Arc::new(ScannerState::new()))
    }

    struct GatedSource {
        gate: Arc<Notify>,
        pools: Vec<Pool>,
    }

    #[async_trait]
    impl PoolSource for GatedSource {
        async fn snapshot(&self, _: &str) -> EngineResult<Vec<Pool>> {
            self.gate.notified().await;
            Ok(self.pools.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl PoolSource for BrokenSource {
        async fn snapshot(&self, _: &str) -> EngineResult<Vec<Pool>> {
            Err(EngineError::Network { message: "unreachable".to_string(), source: None })
        }
    }

    #[tokio::test]
    async fn tick_ranks_profitable_routes() {
        let mut pools = weth_usdc_gap();
        pools.push(pool("uniswap", "0x3", WETH, DAI, dec!(2000)));
        pools.push(pool("curve", "0x4", WETH, DAI, dec!(2060)));
        let scanner = scanner_over(Arc::new(StaticPoolSource::new(pools)));

        let TickOutcome::Completed(routes) = scanner.tick().await else {
            panic!("expected a completed scan");
        };

        assert_eq!(routes.len(), 2);
        assert!(routes[0].net_pnl_bps >= routes[1].net_pnl_bps);
        assert!(routes.iter().all(|r| r.atomic_safe && r.net_pnl_bps > dec!(5)));
        assert_eq!(scanner.state().last_results().await.len(), 2);
        assert!(scanner.state().last_completed_at().await.is_some());
        assert!(!scanner.state().is_scanning());
    }

    #[tokio::test]
    async fn stablecoin_gap_pays_gas_in_its_own_units() {
        let stable_gap = vec![
            pool("uniswap", "0x5", DAI, USDC, dec!(1.02)),
            pool("sushiswap", "0x6", DAI, USDC, dec!(1)),
        ];
        let unpriced = scanner_over(Arc::new(StaticPoolSource::new(stable_gap.clone())));
        let TickOutcome::Completed(routes) = unpriced.tick().await else {
            panic!("expected a completed scan");
        };
        // no WETH pool to price gas in DAI or USDC
        assert!(routes.is_empty());

        let mut priced = stable_gap;
        priced.push(pool("uniswap", "0x7", WETH, DAI, dec!(2000)));
        let scanner = scanner_over(Arc::new(StaticPoolSource::new(priced)));
        let TickOutcome::Completed(routes) = scanner.tick().await else {
            panic!("expected a completed scan");
        };
        // ~0.01 DAI of spread on 1 DAI against ~14.8 DAI of gas
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn expensive_gas_routes_are_filtered() {
        let mut config = ScannerConfig::default();
        config.profit.gas_price_overrides_gwei.insert("ethereum".to_string(), dec!(100));
        let wide_gap = vec![
            pool("uniswap", "0x1", WETH, USDC, dec!(2400)),
            pool("sushiswap", "0x2", WETH, USDC, dec!(2000)),
        ];
        let scanner = OpportunityScanner::new(
            config,
            Arc::new(StaticPoolSource::new(wide_gap)),
            Arc::new(ScannerState::new()),
        );

        // still profitable, but 371k gas at 100 gwei is 0.0371, above the 0.01 ceiling
        let TickOutcome::Completed(routes) = scanner.tick().await else {
            panic!("expected a completed scan");
        };
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn source_error_fails_the_tick_and_resets_state() {
        let scanner = scanner_over(Arc::new(BrokenSource));

        assert!(matches!(scanner.tick().await, TickOutcome::Failed));
        assert!(!scanner.state().is_scanning());
        assert_eq!(scanner.state().stats().failed, 1);
    }

    #[tokio::test]
    async fn overlapping_tick_is_dropped() {
        let gate = Arc::new(Notify::new());
        let source = GatedSource { gate: gate.clone(), pools: weth_usdc_gap() };
        let scanner = Arc::new(scanner_over(Arc::new(source)));

        let running = {
            let scanner = scanner.clone();
            tokio::spawn(async move { scanner.tick().await })
        };
        while !scanner.state().is_scanning() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(scanner.tick().await, TickOutcome::Skipped));

        gate.notify_one();
        let first = running.await.unwrap();
        assert!(matches!(first, TickOutcome::Completed(ref routes) if routes.len() == 1));
        assert_eq!(scanner.state().stats().skipped, 1);
        assert_eq!(scanner.state().stats().completed, 1);
    }

    #[tokio::test]
    async fn run_forwards_results_until_shutdown() {
        let config = ScannerConfig {
            interval: Duration::from_millis(20),
            ..ScannerConfig::default()
        };
        let scanner = Arc::new(OpportunityScanner::new(
            config,
            Arc::new(StaticPoolSource::new(weth_usdc_gap())),
            Arc::new(ScannerState::new()),
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(scanner.clone().run(shutdown_rx, results_tx));

        let routes = tokio::time::timeout(Duration::from_secs(5), results_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(routes.len(), 1);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }
}
