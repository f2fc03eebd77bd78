//! Mainnet addresses of the SushiSwap contracts.

use alloy::primitives::{Address, address};

/// Address for the SushiSwap router.
pub const SUSHISWAP_ROUTER: Address = address!("d9e1cE17f2641f24aE83637ab66a2cca9C378B9F");

/// Address for the SushiSwap pair factory.
pub const SUSHISWAP_FACTORY: Address = address!("C0AEe478e3658e2610c5F7A4A2E1777cE9e4f2Ac");
