//! Mainnet addresses of commonly used tokens.

use alloy::primitives::{Address, address};

/// Address for the `WETH` token.
pub const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

/// Address for the `SUSHI` token.
pub const SUSHI: Address = address!("6B3595068778DD592e39A122f4f5a5cF09C90fE2");

/// Address for the `GNO` token.
pub const GNO: Address = address!("6810e776880c02933d47db1b9fc05908e5386b96");

/// Address for the `DAI` token.
pub const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");

/// Address for the `USDC` token.
pub const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// Address for the `USDT` token.
pub const USDT: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");

/// Address for the `WBTC` token.
pub const WBTC: Address = address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599");
