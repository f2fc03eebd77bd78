//! Mid-price quotes for the selected token pair.

use {
    crate::{
        routing::TokenKind,
        sources::uniswap_v2::pool_fetching::{Pool, PoolFetching},
    },
    alloy::primitives::{Address, U256},
    anyhow::anyhow,
    model::{TokenPair, quote::TradeQuote, token::Token},
    num::{BigRational, One},
    number::{
        conversions::pow10,
        format::{DEFAULT_SIGNIFICANT_DIGITS, to_significant},
    },
    std::{collections::HashSet, sync::Arc},
};

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("no liquidity pool for {0:?}")]
    PoolNotFound(TokenPair),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which of the two selected tokens get a price.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuotePlan {
    PriceFirst,
    PriceSecond,
    PriceBoth,
}

impl QuotePlan {
    /// A native or wrapped token is the unit prices are quoted in, so only the
    /// other token needs a price. The native asset is checked before the
    /// wrapped one and the first token before the second.
    pub fn select(first: TokenKind, second: TokenKind) -> Self {
        match (first, second) {
            (TokenKind::Native, _) => Self::PriceSecond,
            (_, TokenKind::Native) => Self::PriceFirst,
            (TokenKind::Wrapped, _) => Self::PriceSecond,
            (_, TokenKind::Wrapped) => Self::PriceFirst,
            (TokenKind::Standard, TokenKind::Standard) => Self::PriceBoth,
        }
    }
}

pub struct PriceCalculator {
    pools: Arc<dyn PoolFetching>,
    wrapped_native: Token,
}

impl PriceCalculator {
    pub fn new(pools: Arc<dyn PoolFetching>, wrapped_native: Token) -> Self {
        Self {
            pools,
            wrapped_native,
        }
    }

    fn kind(&self, token: &Token) -> TokenKind {
        TokenKind::of(token.address, self.wrapped_native.address)
    }

    /// Mid-prices of the selected tokens in the wrapped native token, keyed by
    /// symbol and rendered with six significant digits.
    pub async fn calculate_trade(
        &self,
        first: &Token,
        second: &Token,
    ) -> Result<TradeQuote, PricingError> {
        let priced = match QuotePlan::select(self.kind(first), self.kind(second)) {
            QuotePlan::PriceFirst => vec![first],
            QuotePlan::PriceSecond => vec![second],
            QuotePlan::PriceBoth => vec![first, second],
        };

        let pairs = priced
            .iter()
            .filter_map(|token| self.pair_with_wrapped(token))
            .collect::<HashSet<_>>();
        let pools = self.pools.fetch(pairs).await?;

        priced
            .into_iter()
            .map(|token| {
                let price = self.price_in_wrapped(token, &pools)?;
                Ok((
                    token.symbol.clone(),
                    to_significant(&price, DEFAULT_SIGNIFICANT_DIGITS),
                ))
            })
            .collect()
    }

    fn pair_with_wrapped(&self, token: &Token) -> Option<TokenPair> {
        match self.kind(token) {
            TokenKind::Standard => TokenPair::new(token.address, self.wrapped_native.address),
            TokenKind::Native | TokenKind::Wrapped => None,
        }
    }

    /// Price of one whole `token` in whole wrapped native tokens.
    fn price_in_wrapped(&self, token: &Token, pools: &[Pool]) -> Result<BigRational, PricingError> {
        let Some(pair) = self.pair_with_wrapped(token) else {
            return Ok(BigRational::one());
        };
        let price = pools
            .iter()
            .find(|pool| pool.tokens == pair)
            .and_then(|pool| pool.mid_price(token.address))
            .ok_or(PricingError::PoolNotFound(pair))?;
        Ok(price * pow10(i64::from(token.decimals) - i64::from(self.wrapped_native.decimals)))
    }

    /// Expected output of swapping `amount_in` along `path` at the current
    /// reserves.
    pub async fn estimate_amount_out(
        &self,
        path: &[Address],
        amount_in: U256,
    ) -> Result<U256, PricingError> {
        let pairs = path
            .windows(2)
            .map(|hop| {
                TokenPair::new(hop[0], hop[1])
                    .ok_or_else(|| anyhow!("degenerate swap path {path:?}").into())
            })
            .collect::<Result<Vec<_>, PricingError>>()?;
        let pools = self.pools.fetch(pairs.iter().copied().collect()).await?;

        path.iter()
            .zip(&pairs)
            .try_fold(amount_in, |amount, (token_in, pair)| {
                let pool = pools
                    .iter()
                    .find(|pool| pool.tokens == *pair)
                    .ok_or(PricingError::PoolNotFound(*pair))?;
                let (amount_out, _) = pool
                    .get_amount_out(*token_in, amount)
                    .ok_or_else(|| anyhow!("insufficient liquidity in pool {:?}", pool.address))?;
                Ok(amount_out)
            })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::sources::uniswap_v2::pool_fetching::test_util::FakePoolFetcher,
        maplit::btreemap,
        testlib::tokens::{DAI, GNO, SUSHI, USDC, WETH},
    };

    const ETHER: u128 = 1_000_000_000_000_000_000;

    fn token(address: Address, symbol: &str, decimals: u8) -> Token {
        Token {
            address,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals,
            logo_uri: None,
        }
    }

    fn pool(token_a: Address, reserve_a: u128, token_b: Address, reserve_b: u128) -> Pool {
        let pair = TokenPair::new(token_a, token_b).unwrap();
        let reserves = if pair.get().0 == token_a {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        Pool::uniswap(Address::with_last_byte(0xff), pair, reserves)
    }

    fn calculator() -> PriceCalculator {
        let pools = FakePoolFetcher(vec![
            pool(DAI, 3_000_000 * ETHER, WETH, 1_000 * ETHER),
            pool(USDC, 3_000_000 * 1_000_000, WETH, 1_000 * ETHER),
            pool(SUSHI, 1_000_000 * ETHER, WETH, 2_500 * ETHER),
        ]);
        PriceCalculator::new(Arc::new(pools), token(WETH, "WETH", 18))
    }

    #[test]
    fn plan_depends_only_on_token_kinds() {
        use {QuotePlan::*, TokenKind::*};
        let cases = [
            ((Native, Native), PriceSecond),
            ((Native, Wrapped), PriceSecond),
            ((Native, Standard), PriceSecond),
            ((Wrapped, Native), PriceFirst),
            ((Standard, Native), PriceFirst),
            ((Wrapped, Wrapped), PriceSecond),
            ((Wrapped, Standard), PriceSecond),
            ((Standard, Wrapped), PriceFirst),
            ((Standard, Standard), PriceBoth),
        ];
        for ((first, second), plan) in cases {
            assert_eq!(QuotePlan::select(first, second), plan, "{first} {second}");
        }
    }

    #[tokio::test]
    async fn prices_token_against_native() {
        let quote = calculator()
            .calculate_trade(&Token::native(), &token(SUSHI, "SUSHI", 18))
            .await
            .unwrap();
        assert_eq!(quote.tokens, btreemap! { "SUSHI".to_string() => "0.0025".to_string() });

        let quote = calculator()
            .calculate_trade(&token(DAI, "DAI", 18), &Token::native())
            .await
            .unwrap();
        assert_eq!(
            quote.tokens,
            btreemap! { "DAI".to_string() => "0.000333333".to_string() }
        );
    }

    #[tokio::test]
    async fn prices_token_against_wrapped_with_decimals() {
        let quote = calculator()
            .calculate_trade(&token(WETH, "WETH", 18), &token(USDC, "USDC", 6))
            .await
            .unwrap();
        assert_eq!(
            quote.tokens,
            btreemap! { "USDC".to_string() => "0.000333333".to_string() }
        );
    }

    #[tokio::test]
    async fn prices_both_standard_tokens_independently() {
        let quote = calculator()
            .calculate_trade(&token(DAI, "DAI", 18), &token(SUSHI, "SUSHI", 18))
            .await
            .unwrap();
        assert_eq!(
            quote.tokens,
            btreemap! {
                "DAI".to_string() => "0.000333333".to_string(),
                "SUSHI".to_string() => "0.0025".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn missing_pool_is_reported() {
        let result = calculator()
            .calculate_trade(&token(DAI, "DAI", 18), &token(GNO, "GNO", 18))
            .await;
        assert!(matches!(result, Err(PricingError::PoolNotFound(pair)) if pair.contains(&GNO)));
    }

    #[tokio::test]
    async fn estimates_output_along_path() {
        let amount_out = calculator()
            .estimate_amount_out(&[DAI, WETH, SUSHI], U256::from(3_000 * ETHER))
            .await
            .unwrap();
        assert_eq!(amount_out, U256::from(397_049_872_817_988_490_909_u128));

        let missing = calculator()
            .estimate_amount_out(&[GNO, WETH], U256::from(ETHER))
            .await;
        assert!(matches!(missing, Err(PricingError::PoolNotFound(_))));
        assert!(
            calculator()
                .estimate_amount_out(&[DAI, DAI], U256::from(ETHER))
                .await
                .is_err()
        );
    }
}
