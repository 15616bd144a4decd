//! DEX Arbitrage Engine - Main Entry Point
//!
//! Validates configured tokens once, then scans for arbitrage until Ctrl+C

use anyhow::Result;
use dex_arb_engine::*;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use dex_arb_engine::{
    discovery::{discover_candidate, fetch_bridge_pools},
    network::{DexScreenerClient, GoPlusClient, PriceProvider, SecurityProvider},
    scanner::{OpportunityScanner, PoolSource, ProviderPoolSource, ScannerState, StaticPoolSource},
    storage::JsonlAuditLog,
    validation::AssetValidator,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories(Path::new("output"))?;

    let config = Config::load();

    info!("🔎 DEX Arbitrage Engine v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Chains: {}", config.scanner.chains.join(", "));
    info!("   Scan Interval: {}s", config.scanner.interval.as_secs());
    info!("   Min PnL: {} bps", config.scanner.profit.min_pnl_bps);
    info!("   Max Gas Cost: {} native", config.scanner.max_gas_cost_eth);
    info!("   TVL Floor: ${}", config.validator.policy.tvl_min_usd);
    info!("   Min Safety Score: {}", config.validator.policy.min_safety_score);
    info!("   Hops: {}-{}", config.validator.policy.min_hops, config.validator.policy.max_hops);
    info!("   Audit Log: {}", config.audit_log_path);

    let prices: Arc<dyn PriceProvider> = Arc::new(DexScreenerClient::new(&config.providers)?);
    let security: Arc<dyn SecurityProvider> = Arc::new(GoPlusClient::new(&config.providers)?);
    let audit = Arc::new(JsonlAuditLog::open(&config.audit_log_path)?);
    let validator = AssetValidator::new(audit);

    validate_startup_tokens(&config, &validator, prices.as_ref(), security.as_ref()).await;

    let source: Arc<dyn PoolSource> = match &config.pools_file {
        Some(path) => {
            info!("📂 Loading pools from {}", path);
            Arc::new(StaticPoolSource::from_json_file(path)?)
        }
        None => {
            if config.watch_tokens.is_empty() {
                warn!("⚠️  No WATCH_TOKENS_<CHAIN> or POOLS_FILE set; scans will find nothing");
            }
            Arc::new(ProviderPoolSource::new(prices.clone(), config.watch_tokens.clone()))
        }
    };

    let state = Arc::new(ScannerState::new());
    let scanner = Arc::new(OpportunityScanner::new(config.scanner.clone(), source, state.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (results_tx, mut results_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        let _ = shutdown_tx.send(true);
    });

    info!("\n🚀 Starting scanner loop...\n");
    let start_time = Instant::now();
    let scan_task = tokio::spawn(scanner.run(shutdown_rx, results_tx));

    let mut total_opportunities: u64 = 0;
    while let Some(routes) = results_rx.recv().await {
        for route in &routes {
            utils::print_arbitrage_route(route);
            if let Err(e) = storage::save_opportunity(route) {
                error!("Failed to save opportunity {}: {}", route.id, e);
            }
        }
        total_opportunities += routes.len() as u64;
    }

    // the channel closes once the scanner and its in-flight ticks are gone
    if let Err(e) = tokio::time::timeout(Duration::from_secs(5), scan_task).await {
        warn!("Scanner did not stop in time: {}", e);
    }

    if let Some(at) = state.last_completed_at().await {
        info!("Last completed scan at {}", at.format("%H:%M:%S UTC"));
    }
    utils::print_session_stats(start_time, &state.stats(), total_opportunities);
    info!("👋 Shutdown complete");
    Ok(())
}

async fn validate_startup_tokens(
    config: &Config,
    validator: &AssetValidator,
    prices: &dyn PriceProvider,
    security: &dyn SecurityProvider,
) {
    if config.validate_tokens.is_empty() {
        return;
    }
    info!("🧪 Validating {} configured tokens...", config.validate_tokens.len());

    for (chain_id, address) in &config.validate_tokens {
        let asset = match discover_candidate(prices, security, chain_id, address).await {
            Ok(asset) => asset,
            Err(e) if e.is_data_unavailable() => {
                warn!("⚠️  Skipping {}:{}: {}", chain_id, address, e);
                continue;
            }
            Err(e) => {
                error!("Discovery failed for {}:{}: {}", chain_id, address, e);
                continue;
            }
        };
        if let Err(e) = validator.discover(&asset) {
            error!("Audit write failed for {}: {}", asset.trace_id, e);
            continue;
        }

        let bridge_pools = fetch_bridge_pools(prices, chain_id).await.unwrap_or_else(|e| {
            warn!("⚠️  No bridge pools for {}: {}", chain_id, e);
            Vec::new()
        });

        match validator.run_full_pipeline(&asset, &config.validator, &bridge_pools) {
            Ok(validated) => {
                utils::print_validation_summary(&validated);
                if validated.is_approved() {
                    if let Err(e) = validator.add_to_trading(&validated) {
                        error!("Could not add {} to trading: {}", asset.trace_id, e);
                    }
                }
            }
            Err(e) => error!("Validation failed for {}: {}", asset.trace_id, e),
        }
    }
}
