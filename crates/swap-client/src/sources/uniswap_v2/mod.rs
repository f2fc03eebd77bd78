//! Uniswap V2 like liquidity source implementation.

pub mod pair_provider;
pub mod pool_fetching;

use {
    self::{
        pair_provider::PairProvider,
        pool_fetching::{DefaultPoolReader, PoolFetcher, PoolFetching},
    },
    alloy::primitives::{Address, B256, b256},
    anyhow::{Context, Result},
    contracts::alloy::{InstanceExt, SushiSwapRouter},
    ethrpc::Web3,
    std::{sync::Arc, time::Duration},
};

pub const UNISWAP_INIT: B256 =
    b256!("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");
pub const SUSHISWAP_INIT: B256 =
    b256!("e18a34eb0e04b04f7a0ac29a6e80748dca96319b42c54d679cb821dca90c6303");

/// The router together with what it tells us about its liquidity: the pair
/// factory and the wrapped native token it routes through.
pub struct UniV2Source {
    pub router: SushiSwapRouter::Instance,
    pub wrapped_native: Address,
    pub pool_fetching: Arc<dyn PoolFetching>,
}

impl UniV2Source {
    /// Connects to the router at `router` or, if none is given, at the
    /// router's known deployment for the current chain.
    pub async fn new(
        web3: &Web3,
        router: Option<Address>,
        init_code_digest: B256,
        missing_pool_cache_time: Duration,
    ) -> Result<Self> {
        let router = match router {
            Some(address) => SushiSwapRouter::Instance::new(address, web3.provider.clone()),
            None => SushiSwapRouter::Instance::deployed(&web3.provider).await?,
        };
        let factory = router
            .factory()
            .call()
            .await
            .context("could not fetch router factory")?;
        let wrapped_native = router
            .WETH()
            .call()
            .await
            .context("could not fetch wrapped native token")?;
        tracing::debug!(router = ?router.address(), ?factory, ?wrapped_native, "connected to router");

        let pair_provider = PairProvider {
            factory,
            init_code_digest: init_code_digest.0,
        };
        let pool_fetching = Arc::new(PoolFetcher::new(
            DefaultPoolReader::new(web3.clone(), pair_provider),
            missing_pool_cache_time,
        ));
        Ok(Self {
            router,
            wrapped_native,
            pool_fetching,
        })
    }
}
