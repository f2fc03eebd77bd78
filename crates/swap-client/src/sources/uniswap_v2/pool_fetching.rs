use {
    super::pair_provider::PairProvider,
    alloy::primitives::{Address, U256},
    anyhow::Result,
    cached::{Cached, TimedCache},
    contracts::alloy::{
        ERC20,
        IUniswapLikePair::{self, IUniswapLikePair::getReservesReturn},
    },
    ethrpc::{Web3, alloy::errors::ignore_non_node_error},
    futures::{FutureExt as _, TryStreamExt, future::BoxFuture, stream::FuturesUnordered},
    model::TokenPair,
    num::BigRational,
    number::conversions::u256_to_big_rational,
    std::{
        collections::HashSet,
        sync::{LazyLock, RwLock},
        time::Duration,
    },
    tracing::instrument,
};

static POOL_MAX_RESERVES: LazyLock<U256> = LazyLock::new(|| U256::from((1u128 << 112) - 1));

/// This type denotes `(reserve_a, reserve_b, token_b)` where
/// `reserve_a` refers to the reserve of the excluded token.
type RelativeReserves = (U256, U256, Address);

#[async_trait::async_trait]
pub trait PoolFetching: Send + Sync {
    /// Fetches the current state of the pools for the given pairs. Pairs
    /// without a pool are left out of the result.
    async fn fetch(&self, token_pairs: HashSet<TokenPair>) -> Result<Vec<Pool>>;
}

/// Trait for abstracting the on-chain reading logic for pool state.
pub trait PoolReading: Send + Sync {
    /// Read the pool state for the specified token pair.
    fn read_state(&self, pair: TokenPair) -> BoxFuture<'_, Result<Option<Pool>>>;
}

/// Constant product pool with a fixed fee of 0.3%.
#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug)]
pub struct Pool {
    pub address: Address,
    pub tokens: TokenPair,
    pub reserves: (u128, u128),
}

const FEE_NUMERATOR: u64 = 3;
const FEE_DENOMINATOR: u64 = 1000;

impl Pool {
    pub fn uniswap(address: Address, tokens: TokenPair, reserves: (u128, u128)) -> Self {
        Self {
            address,
            tokens,
            reserves,
        }
    }

    /// The mid-price of `base` denominated in the pool's other token, in base
    /// units of both tokens. Returns `None` if `base` is not part of the pool
    /// or the pool is empty.
    pub fn mid_price(&self, base: Address) -> Option<BigRational> {
        if !self.tokens.contains(&base) {
            return None;
        }
        let (reserve_base, reserve_quote, _) = self.get_relative_reserves(base);
        if reserve_base.is_zero() || reserve_quote.is_zero() {
            return None;
        }
        Some(u256_to_big_rational(&reserve_quote) / u256_to_big_rational(&reserve_base))
    }

    /// Given an input amount and token, returns the maximum output amount and
    /// address of the other asset. Returns None if operation not possible
    /// due to arithmetic issues (e.g. over or underflow)
    pub fn get_amount_out(&self, token_in: Address, amount_in: U256) -> Option<(U256, Address)> {
        if !self.tokens.contains(&token_in) {
            return None;
        }
        let (reserve_in, reserve_out, token_out) = self.get_relative_reserves(token_in);
        Some((
            self.amount_out(amount_in, reserve_in, reserve_out)?,
            token_out,
        ))
    }

    /// Given one of the pool's two tokens, returns the pool's reserve of that
    /// token, the reserve of the other token and the other token.
    fn get_relative_reserves(&self, token: Address) -> RelativeReserves {
        // https://github.com/Uniswap/uniswap-v2-periphery/blob/master/contracts/libraries/UniswapV2Library.sol#L53
        let (token0, token1) = self.tokens.get();
        if token == token0 {
            (
                U256::from(self.reserves.0),
                U256::from(self.reserves.1),
                token1,
            )
        } else {
            (
                U256::from(self.reserves.1),
                U256::from(self.reserves.0),
                token0,
            )
        }
    }

    fn amount_out(&self, amount_in: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
        if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
            return None;
        }

        let amount_in_with_fee =
            amount_in.checked_mul(U256::from(FEE_DENOMINATOR - FEE_NUMERATOR))?;
        let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
        let denominator = reserve_in
            .checked_mul(U256::from(FEE_DENOMINATOR))?
            .checked_add(amount_in_with_fee)?;
        let amount_out = numerator.checked_div(denominator)?;

        check_final_reserves(amount_in, amount_out, reserve_in, reserve_out)?;
        Some(amount_out)
    }
}

fn check_final_reserves(
    amount_in: U256,
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
) -> Option<(U256, U256)> {
    let final_reserve_in = reserve_in.checked_add(amount_in)?;
    let final_reserve_out = reserve_out.checked_sub(amount_out)?;

    if final_reserve_in > *POOL_MAX_RESERVES {
        None
    } else {
        Some((final_reserve_in, final_reserve_out))
    }
}

/// Reads pools through a [`PoolReading`] and remembers for a while which
/// pairs have no pool so they aren't queried on every form change.
pub struct PoolFetcher<Reader> {
    pub pool_reader: Reader,
    pub non_existent_pools: RwLock<TimedCache<TokenPair, ()>>,
}

impl<Reader> PoolFetcher<Reader> {
    pub fn new(reader: Reader, cache_time: Duration) -> Self {
        Self {
            pool_reader: reader,
            non_existent_pools: RwLock::new(TimedCache::with_lifespan(cache_time.as_secs())),
        }
    }
}

#[async_trait::async_trait]
impl<Reader> PoolFetching for PoolFetcher<Reader>
where
    Reader: PoolReading,
{
    #[instrument(skip_all)]
    async fn fetch(&self, token_pairs: HashSet<TokenPair>) -> Result<Vec<Pool>> {
        let mut futures: FuturesUnordered<_> = {
            let mut non_existent_pools = self
                .non_existent_pools
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            token_pairs
                .into_iter()
                .filter(|pair| non_existent_pools.cache_get(pair).is_none())
                .map(|pair| async move {
                    let state = self.pool_reader.read_state(pair).await?;
                    Ok::<_, anyhow::Error>((pair, state))
                })
                .collect()
        };

        let mut new_missing_pairs = vec![];
        let mut pools = Vec::with_capacity(futures.len());

        while let Some((pair, result)) = futures.try_next().await? {
            match result {
                Some(pool) => pools.push(pool),
                None => new_missing_pairs.push(pair),
            }
        }

        if !new_missing_pairs.is_empty() {
            tracing::debug!(token_pairs = ?new_missing_pairs, "remembering missing pools");
            let mut non_existent_pools = self
                .non_existent_pools
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            for pair in new_missing_pairs {
                non_existent_pools.cache_set(pair, ());
            }
        }
        Ok(pools)
    }
}

/// The default pool reader implementation.
///
/// This fetches on-chain pool state for Uniswap-like pools assuming a constant
/// fee of 0.3%.
pub struct DefaultPoolReader {
    pub pair_provider: PairProvider,
    pub web3: Web3,
}

impl DefaultPoolReader {
    pub fn new(web3: Web3, pair_provider: PairProvider) -> Self {
        Self {
            pair_provider,
            web3,
        }
    }
}

impl PoolReading for DefaultPoolReader {
    fn read_state(&self, pair: TokenPair) -> BoxFuture<'_, Result<Option<Pool>>> {
        let pair_address = self.pair_provider.pair_address(&pair);

        // Fetch ERC20 token balances of the pools to sanity check with reserves
        let token0 = ERC20::Instance::new(pair.get().0, self.web3.provider.clone());
        let token1 = ERC20::Instance::new(pair.get().1, self.web3.provider.clone());
        let pair_contract =
            IUniswapLikePair::Instance::new(pair_address, self.web3.provider.clone());

        async move {
            let fetch_token0_balance = token0.balanceOf(pair_address);
            let fetch_token1_balance = token1.balanceOf(pair_address);
            let fetch_reserves = pair_contract.getReserves();

            let (reserves, token0_balance, token1_balance) = futures::join!(
                fetch_reserves.call().into_future(),
                fetch_token0_balance.call().into_future(),
                fetch_token1_balance.call().into_future()
            );

            handle_results(
                FetchedPool {
                    pair,
                    reserves,
                    token0_balance,
                    token1_balance,
                },
                pair_address,
            )
        }
        .boxed()
    }
}

struct FetchedPool {
    pair: TokenPair,
    reserves: Result<getReservesReturn, alloy::contract::Error>,
    token0_balance: Result<U256, alloy::contract::Error>,
    token1_balance: Result<U256, alloy::contract::Error>,
}

fn handle_results(fetched_pool: FetchedPool, address: Address) -> Result<Option<Pool>> {
    let reserves = ignore_non_node_error(fetched_pool.reserves)?;
    let token0_balance = ignore_non_node_error(fetched_pool.token0_balance)?;
    let token1_balance = ignore_non_node_error(fetched_pool.token1_balance)?;

    let pool = reserves.and_then(|reserves| {
        let r0 = u128::try_from(reserves.reserve0).ok()?;
        let r1 = u128::try_from(reserves.reserve1).ok()?;
        // Tokens with an elastic supply can reduce the pool's balance below its
        // cached reserves, which breaks the constant product. Such pools are
        // ignored.
        if U256::from(r0) > token0_balance? || U256::from(r1) > token1_balance? {
            return None;
        }
        Some(Pool::uniswap(address, fetched_pool.pair, (r0, r1)))
    });

    Ok(pool)
}

pub mod test_util {
    use {
        super::{Pool, PoolFetching},
        anyhow::Result,
        model::TokenPair,
        std::collections::HashSet,
    };

    #[derive(Default)]
    pub struct FakePoolFetcher(pub Vec<Pool>);

    #[async_trait::async_trait]
    impl PoolFetching for FakePoolFetcher {
        async fn fetch(&self, token_pairs: HashSet<TokenPair>) -> Result<Vec<Pool>> {
            Ok(self
                .0
                .iter()
                .filter(|pool| token_pairs.contains(&pool.tokens))
                .copied()
                .collect())
        }
    }
}
