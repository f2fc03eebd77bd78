pub mod alloy;

use {::alloy::providers::DynProvider, url::Url};

pub type AlloyProvider = DynProvider;

/// Thin wrapper around the provider (client communicating with the
/// blockchain) that is handed to every component reading chain state.
#[derive(Debug, Clone)]
pub struct Web3 {
    pub provider: AlloyProvider,
}

impl Web3 {
    pub fn new(provider: AlloyProvider) -> Self {
        Self { provider }
    }

    /// Creates a read-only instance talking to the node at `url`.
    pub fn from_url(url: &Url) -> Self {
        Self::new(crate::alloy::provider(url))
    }
}
