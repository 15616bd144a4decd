//! Display and printing utilities

use std::time::Instant;
use tracing::{info, warn};
use crate::{
    scanner::ScanStats,
    types::{ArbitrageRoute, AssetWithValidation},
};

pub fn print_session_stats(start_time: Instant, stats: &ScanStats, total_opportunities: u64) {
    let runtime = start_time.elapsed().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   🔍 SCANS:");
    info!("     Completed: {}", stats.completed);
    info!("     Dropped (overlap): {}", stats.skipped);
    info!("     Failed: {}", stats.failed);
    info!("   📈 ARBITRAGE:");
    info!("     Total opportunities: {}", total_opportunities);
    info!("     Per completed scan: {:.2}",
        if stats.completed > 0 {
            total_opportunities as f64 / stats.completed as f64
        } else {
            0.0
        }
    );
    info!("");
}

pub fn print_arbitrage_route(route: &ArbitrageRoute) {
    warn!("\n🎯 ARBITRAGE ROUTE #{}", route.id);
    warn!("📍 Chain: {} ({} legs, {})", route.chain_id, route.legs, route.reason);
    warn!("🔁 Path:");
    for (i, hop) in route.route.iter().enumerate() {
        warn!("   {}. {} {} -> {} ({} bps fee)",
            i + 1,
            hop.dex_id,
            hop.token_in,
            hop.token_out,
            hop.fee_bps
        );
    }
    warn!("💰 Profit Analysis:");
    warn!("   Amount In:  {:.6}", route.amount_in);
    warn!("   Amount Out: {:.6}", route.amount_out);
    warn!("   Gas Cost:   {:.6} native", route.gas_cost_eth);
    warn!("   Net PnL:    {:.6} ({:.2} bps)", route.net_pnl, route.net_pnl_bps);
    warn!("🚀 Execution: {:?} (atomic: {})", route.execution_hint, route.atomic_safe);
}

pub fn print_validation_summary(validated: &AssetWithValidation) {
    let asset = &validated.asset;
    let stages: Vec<u8> = validated.stages_passed.iter().map(|s| s.number()).collect();

    if validated.is_approved() {
        warn!("\n✅ ASSET APPROVED {} ({})", asset.symbol, asset.trace_id);
        warn!("   Stages passed: {:?}", stages);
        for plan in validated.tradable_plans() {
            warn!("   {} hops via {}: {:.2} bps est. profit",
                plan.hops,
                plan.route.join(" -> "),
                plan.est_profit_bps.unwrap_or_default()
            );
        }
    } else {
        info!("\n⛔ ASSET REJECTED {} ({})", asset.symbol, asset.trace_id);
        info!("   Stages passed: {:?}", stages);
        info!("   Reason: {}",
            validated.validation.reason.map(|r| r.as_str()).unwrap_or("UNKNOWN")
        );
        if let Some(message) = &validated.validation.message {
            info!("   Detail: {}", message);
        }
    }
}
