//! Form driven controllers for market swaps and limit orders.
//!
//! A controller owns the state of its form. Every change to the form is
//! handed to [`FormCore::on_change`] which refreshes the approval flag and the
//! quote. Since the controllers are driven through `&mut self` the lookups of
//! one change complete before the next change is processed, so results of an
//! older form can't overwrite newer ones.

pub mod limit_order;
pub mod market_order;

use {
    crate::{
        notification::{self, Notification},
        pricing::PriceCalculator,
        traits::{Notifier, TransactionSending},
        web3::{Spender, Web3Service},
    },
    alloy::primitives::{TxHash, U256},
    anyhow::{Context, Result},
    model::{quote::TradeQuote, token::Token},
    number::units::{format_units, parse_units},
    std::sync::Arc,
    tokio::sync::watch,
};

/// User input of an order form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub token_one: Option<Token>,
    pub token_one_amount: Option<String>,
    pub token_two: Option<Token>,
    /// Minimum amount of `token_two` to receive. Only used by limit orders.
    pub min_out: Option<String>,
}

impl OrderForm {
    /// The entered amount of `token_one` in base units if it parses and is
    /// positive.
    fn positive_amount(&self) -> Option<U256> {
        let token = self.token_one.as_ref()?;
        let amount = parse_units(self.token_one_amount.as_deref()?, token.decimals).ok()?;
        (!amount.is_zero()).then_some(amount)
    }

    fn tokens(&self) -> Result<(&Token, &Token)> {
        Ok((
            self.token_one.as_ref().context("no token to sell selected")?,
            self.token_two.as_ref().context("no token to buy selected")?,
        ))
    }

    fn amount(&self) -> Result<&str> {
        self.token_one_amount
            .as_deref()
            .context("no amount entered")
    }
}

/// What both controllers need to talk to the outside world.
#[derive(Clone)]
pub struct Services {
    pub web3: Arc<Web3Service>,
    pub pricing: Arc<PriceCalculator>,
    pub sender: Arc<dyn TransactionSending>,
    pub notifier: Arc<dyn Notifier>,
}

/// State and behaviour shared by the market and limit order forms.
pub struct FormCore {
    services: Services,
    spender: Spender,
    form: OrderForm,
    need_approve_token: bool,
    cannot_find_pool: bool,
    quote: Option<TradeQuote>,
    pending_tx: watch::Sender<bool>,
}

impl FormCore {
    fn new(services: Services, spender: Spender) -> Self {
        Self {
            services,
            spender,
            form: OrderForm::default(),
            need_approve_token: false,
            cannot_find_pool: false,
            quote: None,
            pending_tx: watch::Sender::new(false),
        }
    }

    pub fn form(&self) -> &OrderForm {
        &self.form
    }

    pub fn need_approve_token(&self) -> bool {
        self.need_approve_token
    }

    pub fn cannot_find_pool(&self) -> bool {
        self.cannot_find_pool
    }

    pub fn quote(&self) -> Option<&TradeQuote> {
        self.quote.as_ref()
    }

    /// Follows whether a transaction of this form is in flight.
    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.pending_tx.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        *self.pending_tx.borrow()
    }

    fn set_pending(&self, pending: bool) {
        self.pending_tx.send_replace(pending);
    }

    fn notify(&self, notification: Notification) {
        self.services.notifier.notify(notification);
    }

    pub async fn on_change(&mut self, form: OrderForm) {
        self.form = form;

        if let Some(amount) = self.form.positive_amount() {
            if let Some(token) = self.form.token_one.clone().filter(|token| !token.is_native()) {
                self.refresh_allowance(&token, amount).await;
            }
        }

        if self.form.token_one.is_some() && self.form.token_two.is_some() {
            self.quote = self.calculate_trade().await;
        }
    }

    /// Limit orders need an allowance covering the amount since the
    /// settlement contract pulls it later. Swaps only need some allowance
    /// for the router.
    async fn refresh_allowance(&mut self, token: &Token, amount: U256) {
        let required = match self.spender {
            Spender::Settlement => amount,
            Spender::Router => U256::ZERO,
        };
        match self.services.web3.allowance(token, self.spender).await {
            Ok(allowance) => self.need_approve_token = allowance <= required,
            Err(err) => tracing::warn!(?err, token = %token.symbol, "could not fetch allowance"),
        }
    }

    async fn calculate_trade(&mut self) -> Option<TradeQuote> {
        self.cannot_find_pool = false;
        let (one, two) = self.form.tokens().ok()?;
        match self.services.pricing.calculate_trade(one, two).await {
            Ok(quote) => Some(quote),
            Err(err) => {
                tracing::debug!(?err, "could not price trade");
                self.cannot_find_pool = true;
                None
            }
        }
    }

    /// Fills in the account's whole balance of the token to sell.
    pub async fn set_max_balance(&mut self) {
        match self.max_balance().await {
            Ok(amount) => {
                let mut form = self.form.clone();
                form.token_one_amount = Some(amount);
                self.on_change(form).await;
            }
            Err(err) => {
                tracing::error!(?err, "could not fetch balance");
                self.notify(Notification::error(notification::MISSING_BALANCE));
            }
        }
    }

    async fn max_balance(&self) -> Result<String> {
        let token = self
            .form
            .token_one
            .as_ref()
            .context("no token to sell selected")?;
        let balance = self.services.web3.balance(token).await?;
        Ok(format_units(balance, token.decimals))
    }

    /// Grants the spender of this form an unlimited allowance for the token
    /// to sell.
    pub async fn approve_token(&mut self) -> Option<TxHash> {
        self.set_pending(true);
        let result = self.send_approval().await;
        self.set_pending(false);
        match result {
            Ok(hash) => {
                self.need_approve_token = false;
                Some(hash)
            }
            Err(err) => {
                tracing::error!(?err, "approval failed");
                self.need_approve_token = true;
                self.notify(Notification::error(notification::REJECTED_TRANSACTION));
                None
            }
        }
    }

    async fn send_approval(&self) -> Result<TxHash> {
        let token = self
            .form
            .token_one
            .as_ref()
            .context("no token to approve selected")?;
        let approval = self.services.web3.approve(token, self.spender);
        let hashes = self.services.sender.send(vec![approval]).await?;
        hashes.into_iter().next().context("no approval transaction sent")
    }

    pub fn reset(&mut self) {
        self.form = OrderForm::default();
        self.quote = None;
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use {
        super::*,
        crate::{
            notification::Notification,
            sources::uniswap_v2::pool_fetching::{Pool, test_util::FakePoolFetcher},
            traits::{MockChainRead, MockNotifier, MockTransactionSending},
        },
        alloy::primitives::Address,
        model::TokenPair,
        testlib::tokens::{DAI, GNO, SUSHI, USDC, WETH},
    };

    pub const ACCOUNT: Address = Address::with_last_byte(0xaa);
    pub const ROUTER: Address = Address::with_last_byte(0x01);
    pub const SETTLEMENT: Address = Address::with_last_byte(0x02);
    pub const ETHER: u128 = 1_000_000_000_000_000_000;

    pub fn token(address: Address, symbol: &str, decimals: u8) -> Token {
        Token {
            address,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals,
            logo_uri: None,
        }
    }

    pub fn dai() -> Token {
        token(DAI, "DAI", 18)
    }

    pub fn sushi() -> Token {
        token(SUSHI, "SUSHI", 18)
    }

    pub fn usdc() -> Token {
        token(USDC, "USDC", 6)
    }

    pub fn gno() -> Token {
        token(GNO, "GNO", 18)
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

    pub fn form(one: Option<Token>, amount: Option<&str>, two: Option<Token>) -> OrderForm {
        OrderForm {
            token_one: one,
            token_one_amount: amount.map(str::to_string),
            token_two: two,
            min_out: None,
        }
    }

    pub fn services(
        chain: MockChainRead,
        sender: MockTransactionSending,
        notifier: MockNotifier,
    ) -> Services {
        let pools = FakePoolFetcher(vec![
            pool(DAI, 3_000_000 * ETHER, WETH, 1_000 * ETHER),
            pool(SUSHI, 1_000_000 * ETHER, WETH, 2_500 * ETHER),
        ]);
        Services {
            web3: Arc::new(Web3Service::new(
                Arc::new(chain),
                ACCOUNT,
                ROUTER,
                SETTLEMENT,
                WETH,
            )),
            pricing: Arc::new(PriceCalculator::new(
                Arc::new(pools),
                token(WETH, "WETH", 18),
            )),
            sender: Arc::new(sender),
            notifier: Arc::new(notifier),
        }
    }

    /// A notifier expecting exactly one notification with `message`.
    pub fn expect_notification(message: &'static str) -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(move |notification: &Notification| notification.message == message)
            .times(1)
            .return_const(());
        notifier
    }
}
