//! Arbitrage opportunity storage

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;
use crate::types::ArbitrageRoute;

pub fn save_opportunity(route: &ArbitrageRoute) -> Result<()> {
    save_opportunity_in(Path::new("output/opportunities"), route)
}

/// Appends to `arbitrage_<date>.jsonl` under `dir`.
pub fn save_opportunity_in(dir: &Path, route: &ArbitrageRoute) -> Result<()> {
    let filename = dir.join(format!("arbitrage_{}.jsonl", Utc::now().format("%Y-%m-%d")));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(route)?)?;

    info!(
        opportunity_id = %route.id,
        chain = %route.chain_id,
        net_pnl_bps = %route.net_pnl_bps,
        legs = route.legs,
        "Saved arbitrage opportunity"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::estimate_route;
    use crate::config::ProfitConfig;
    use crate::graph::pool_graph::tests::pool;
    use rust_decimal_macros::dec;

    #[test]
    fn routes_are_appended_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let pools = vec![
            pool("uniswap", "0x1", "weth", "usdc", dec!(2040)),
            pool("sushiswap", "0x2", "weth", "usdc", dec!(2000)),
        ];
        let route = estimate_route(&pools, "weth", dec!(1), "arbitrum", &ProfitConfig::default()).unwrap();

        save_opportunity_in(dir.path(), &route).unwrap();
        save_opportunity_in(dir.path(), &route).unwrap();

        let file = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let raw = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
        assert_eq!(first["reason"], "INTER-DEX");
        assert_eq!(first["execution_hint"], "flashloan");
    }
}
