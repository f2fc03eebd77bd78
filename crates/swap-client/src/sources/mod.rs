//! Liquidity sources the client reads prices from.

pub mod uniswap_v2;
