//! Token addresses per chain: wrapped-native anchors and the quote allowlist

use lazy_static::lazy_static;
use std::collections::HashMap;

// Ethereum
pub const WETH_ETHEREUM: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
pub const USDC_ETHEREUM: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
pub const USDT_ETHEREUM: &str = "0xdac17f958d2ee523a2206206994597c13d831ec7";
pub const DAI_ETHEREUM: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";

// BNB Chain
pub const WBNB_BSC: &str = "0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c";
pub const USDT_BSC: &str = "0x55d398326f99059ff775485246999027b3197955";
pub const USDC_BSC: &str = "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d";

// Polygon
pub const WMATIC_POLYGON: &str = "0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270";
pub const USDC_POLYGON: &str = "0x3c499c542cef5e3811e1192ce70d8cc03d5c3359";
pub const USDT_POLYGON: &str = "0xc2132d05d31c914a87c6611c10748aeb04b58e8f";
pub const WETH_POLYGON: &str = "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619";

// Arbitrum
pub const WETH_ARBITRUM: &str = "0x82af49447d8a07e3bd95bd0d56f35241523fbab1";
pub const USDC_ARBITRUM: &str = "0xaf88d065e77c8cc2239327c5edb3a432268e5831";
pub const USDT_ARBITRUM: &str = "0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9";

// Base and Optimism share the OP-stack WETH predeploy
pub const WETH_OP_STACK: &str = "0x4200000000000000000000000000000000000006";
pub const USDC_BASE: &str = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913";
pub const USDBC_BASE: &str = "0xd9aaec86b65d86f6a7b5b1b0c42ffa531710b6ca";
pub const USDC_OPTIMISM: &str = "0x0b2c639c533813f4aa9d7837caf62653d097ff85";
pub const USDT_OPTIMISM: &str = "0x94b008aa00579c1307b0ef2c499ad98a8ce58e58";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteToken {
    pub symbol: &'static str,
    pub address: &'static str,
}

const fn quote(symbol: &'static str, address: &'static str) -> QuoteToken {
    QuoteToken { symbol, address }
}

lazy_static! {
    /// Stablecoins and majors an asset may be paired against, per chain.
    pub static ref QUOTE_TOKENS: HashMap<&'static str, Vec<QuoteToken>> = HashMap::from([
        ("ethereum", vec![
            quote("USDC", USDC_ETHEREUM),
            quote("USDT", USDT_ETHEREUM),
            quote("DAI", DAI_ETHEREUM),
            quote("WETH", WETH_ETHEREUM),
        ]),
        ("bsc", vec![
            quote("USDT", USDT_BSC),
            quote("USDC", USDC_BSC),
            quote("WBNB", WBNB_BSC),
        ]),
        ("polygon", vec![
            quote("USDC", USDC_POLYGON),
            quote("USDT", USDT_POLYGON),
            quote("WETH", WETH_POLYGON),
            quote("WMATIC", WMATIC_POLYGON),
        ]),
        ("arbitrum", vec![
            quote("USDC", USDC_ARBITRUM),
            quote("USDT", USDT_ARBITRUM),
            quote("WETH", WETH_ARBITRUM),
        ]),
        ("base", vec![
            quote("USDC", USDC_BASE),
            quote("USDbC", USDBC_BASE),
            quote("WETH", WETH_OP_STACK),
        ]),
        ("optimism", vec![
            quote("USDC", USDC_OPTIMISM),
            quote("USDT", USDT_OPTIMISM),
            quote("WETH", WETH_OP_STACK),
        ]),
    ]);

    /// Wrapped native token per chain; routes start here when they can.
    pub static ref WRAPPED_NATIVE: HashMap<&'static str, &'static str> = HashMap::from([
        ("ethereum", WETH_ETHEREUM),
        ("bsc", WBNB_BSC),
        ("polygon", WMATIC_POLYGON),
        ("arbitrum", WETH_ARBITRUM),
        ("base", WETH_OP_STACK),
        ("optimism", WETH_OP_STACK),
    ]);
}

pub fn quote_tokens(chain_id: &str) -> &'static [QuoteToken] {
    QUOTE_TOKENS.get(chain_id).map(Vec::as_slice).unwrap_or(&[])
}

pub fn wrapped_native(chain_id: &str) -> Option<&'static str> {
    WRAPPED_NATIVE.get(chain_id).copied()
}
