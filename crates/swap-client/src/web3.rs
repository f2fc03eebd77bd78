//! Account level view of the chain used by the order forms.

use {
    crate::{
        routing::{self, SwapParameters, SwapRoute, TokenKind},
        traits::{ChainRead, Transaction},
    },
    alloy::{
        primitives::{Address, U256},
        sol_types::SolCall,
    },
    anyhow::{Context, Result},
    contracts::alloy::ERC20::ERC20::approveCall,
    model::token::Token,
    number::units::{parse_ether, parse_units},
    std::sync::Arc,
};

/// The contract an allowance is granted to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Spender {
    /// Pulls tokens for market swaps.
    Router,
    /// Pulls tokens when limit orders get filled.
    Settlement,
}

pub struct Web3Service {
    chain: Arc<dyn ChainRead>,
    account: Address,
    router: Address,
    settlement: Address,
    wrapped_native: Address,
}

impl Web3Service {
    pub fn new(
        chain: Arc<dyn ChainRead>,
        account: Address,
        router: Address,
        settlement: Address,
        wrapped_native: Address,
    ) -> Self {
        Self {
            chain,
            account,
            router,
            settlement,
            wrapped_native,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    pub fn spender(&self, spender: Spender) -> Address {
        match spender {
            Spender::Router => self.router,
            Spender::Settlement => self.settlement,
        }
    }

    pub fn is_native(&self, token: &Token) -> bool {
        token.is_native()
    }

    pub fn is_wrapped(&self, token: &Token) -> bool {
        token.address == self.wrapped_native
    }

    pub fn kind(&self, token: &Token) -> TokenKind {
        TokenKind::of(token.address, self.wrapped_native)
    }

    /// The allowance the account granted `spender` for `token`.
    pub async fn allowance(&self, token: &Token, spender: Spender) -> Result<U256> {
        self.chain
            .allowance(token.address, self.account, self.spender(spender))
            .await
    }

    /// Transaction granting `spender` an unlimited allowance for `token`.
    pub fn approve(&self, token: &Token, spender: Spender) -> Transaction {
        let call = approveCall {
            spender: self.spender(spender),
            amount: U256::MAX,
        };
        Transaction {
            to: token.address,
            data: call.abi_encode().into(),
            value: U256::ZERO,
        }
    }

    /// The account's balance of `token` in base units.
    pub async fn balance(&self, token: &Token) -> Result<U256> {
        if self.is_native(token) {
            self.chain.native_balance(self.account).await
        } else {
            self.chain.token_balance(token.address, self.account).await
        }
    }

    /// The route and token path a swap from `first` to `second` takes.
    pub fn route(&self, first: &Token, second: &Token) -> Result<(SwapRoute, Vec<Address>)> {
        let route = SwapRoute::select(self.kind(first), self.kind(second));
        let path = route.path(first.address, second.address, self.wrapped_native)?;
        Ok((route, path))
    }

    /// Router transaction swapping `amount` (in units of `first`) for at least
    /// `amount_out_min` base units of `second`, sent back to the account.
    pub fn swap_tokens(
        &self,
        first: &Token,
        second: &Token,
        amount: &str,
        amount_out_min: U256,
        deadline: U256,
    ) -> Result<Transaction> {
        let (route, path) = self.route(first, second)?;
        tracing::debug!(%route, ?path, "encoding swap");
        let amount_in = parse_units(amount, first.decimals)
            .with_context(|| format!("invalid amount {amount:?}"))?;
        let value = match route {
            SwapRoute::NativeIn => parse_ether(amount)?,
            _ => U256::ZERO,
        };
        let parameters = SwapParameters {
            amount_in,
            amount_out_min,
            recipient: self.account,
            deadline,
        };
        Ok(Transaction {
            to: self.router,
            data: routing::encode(route, path, &parameters),
            value,
        })
    }
}
