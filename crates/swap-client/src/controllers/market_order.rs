use {
    super::{FormCore, OrderForm, Services},
    crate::{
        notification::{self, Notification},
        order::now_in_seconds,
        web3::Spender,
    },
    alloy::primitives::{TxHash, U256},
    anyhow::{Context, Result, ensure},
    number::units::parse_units,
    std::{
        ops::{Deref, DerefMut},
        time::Duration,
    },
};

const BPS_BASE: u64 = 10_000;

pub struct MarketOrderController {
    core: FormCore,
    swap_validity: Duration,
    slippage_bps: Option<u16>,
}

impl MarketOrderController {
    /// Without `slippage_bps` swaps accept any positive output.
    pub fn new(
        services: Services,
        swap_validity: Duration,
        slippage_bps: Option<u16>,
    ) -> Result<Self> {
        if let Some(bps) = slippage_bps {
            ensure!(
                u64::from(bps) <= BPS_BASE,
                "slippage of {bps} bps exceeds {BPS_BASE} bps"
            );
        }
        Ok(Self {
            core: FormCore::new(services, Spender::Router),
            swap_validity,
            slippage_bps,
        })
    }

    /// Swaps the entered amount of the first token for the second one through
    /// the router.
    pub async fn swap(&mut self) -> Option<TxHash> {
        self.core.set_pending(true);
        let result = self.send_swap(&self.core.form).await;
        self.core.set_pending(false);
        self.core.need_approve_token = false;
        match result {
            Ok(hash) => {
                tracing::info!(?hash, "swap mined");
                self.core
                    .notify(Notification::success(notification::SWAP_SUBMITTED));
                Some(hash)
            }
            Err(err) => {
                tracing::error!(?err, "swap failed");
                self.core
                    .notify(Notification::error(notification::SOMETHING_WENT_WRONG));
                None
            }
        }
    }

    async fn send_swap(&self, form: &OrderForm) -> Result<TxHash> {
        let (one, two) = form.tokens()?;
        let amount = form.amount()?;
        let deadline = U256::from(now_in_seconds() + self.swap_validity.as_secs());
        let amount_out_min = self.amount_out_min(form).await?;

        let web3 = &self.core.services.web3;
        let transaction = web3.swap_tokens(one, two, amount, amount_out_min, deadline)?;
        let hashes = self.core.services.sender.send(vec![transaction]).await?;
        hashes.into_iter().next().context("no swap transaction sent")
    }

    /// The expected output at current reserves minus the slippage tolerance,
    /// but at least one base unit.
    async fn amount_out_min(&self, form: &OrderForm) -> Result<U256> {
        let Some(slippage_bps) = self.slippage_bps else {
            return Ok(U256::ONE);
        };
        let (one, two) = form.tokens()?;
        let amount_in = parse_units(form.amount()?, one.decimals)?;
        let (_, path) = self.core.services.web3.route(one, two)?;
        let expected = self
            .core
            .services
            .pricing
            .estimate_amount_out(&path, amount_in)
            .await?;
        let remaining = BPS_BASE.saturating_sub(u64::from(slippage_bps));
        let tolerated = expected * U256::from(remaining) / U256::from(BPS_BASE);
        tracing::debug!(%expected, %tolerated, "minimum swap output");
        Ok(tolerated.max(U256::ONE))
    }
}

impl Deref for MarketOrderController {
    type Target = FormCore;

    fn deref(&self) -> &FormCore {
        &self.core
    }
}

impl DerefMut for MarketOrderController {
    fn deref_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            controllers::test_util::*,
            traits::{MockChainRead, MockNotifier, MockTransactionSending},
        },
        alloy::sol_types::SolCall,
        contracts::alloy::SushiSwapRouter::SushiSwapRouter::{
            swapExactETHForTokensCall,
            swapExactTokensForTokensCall,
        },
        model::token::Token,
        number::units::EthUnit,
        std::sync::Arc,
        testlib::tokens::{SUSHI, WETH},
    };

    const VALIDITY: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn native_in_swap_sends_value_to_router() {
        let mut sender = MockTransactionSending::new();
        sender
            .expect_send()
            .withf(|txs| {
                let Ok(call) = swapExactETHForTokensCall::abi_decode(&txs[0].data) else {
                    return false;
                };
                let deadline = U256::from(now_in_seconds() + 300);
                txs[0].to == ROUTER
                    && txs[0].value == 2u64.eth()
                    && call.path == [WETH, SUSHI]
                    && call.amountOutMin == U256::ONE
                    && call.to == ACCOUNT
                    && call.deadline <= deadline
                    && call.deadline + U256::from(5) >= deadline
            })
            .times(1)
            .returning(|_| Ok(vec![TxHash::repeat_byte(3)]));
        let mut controller = MarketOrderController::new(
            services(
                MockChainRead::new(),
                sender,
                expect_notification(notification::SWAP_SUBMITTED),
            ),
            VALIDITY,
            None,
        )
        .unwrap();
        controller.core.form = form(Some(Token::native()), Some("2"), Some(sushi()));

        assert_eq!(controller.swap().await, Some(TxHash::repeat_byte(3)));
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn slippage_bounds_minimum_output() {
        let mut sender = MockTransactionSending::new();
        sender
            .expect_send()
            .withf(|txs| {
                swapExactTokensForTokensCall::abi_decode(&txs[0].data).is_ok_and(|call| {
                    // 3000 DAI -> WETH -> SUSHI at the fake reserves yields
                    // 397049872817988490909 SUSHI, minus 1%.
                    call.amountOutMin == U256::from(393_079_374_089_808_605_999_u128)
                        && call.amountIn == 3_000u64.eth()
                })
            })
            .times(1)
            .returning(|_| Ok(vec![TxHash::repeat_byte(4)]));
        let mut controller = MarketOrderController::new(
            services(
                MockChainRead::new(),
                sender,
                expect_notification(notification::SWAP_SUBMITTED),
            ),
            VALIDITY,
            Some(100),
        )
        .unwrap();
        controller.core.form = form(Some(dai()), Some("3000"), Some(sushi()));

        assert!(controller.swap().await.is_some());
    }

    #[tokio::test]
    async fn failed_swap_resets_pending_and_notifies() {
        let mut sender = MockTransactionSending::new();
        sender
            .expect_send()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("user rejected")));
        let mut controller = MarketOrderController::new(
            services(
                MockChainRead::new(),
                sender,
                expect_notification(notification::SOMETHING_WENT_WRONG),
            ),
            VALIDITY,
            None,
        )
        .unwrap();
        controller.core.form = form(Some(dai()), Some("1"), Some(sushi()));
        let pending = controller.subscribe_pending();

        assert_eq!(controller.swap().await, None);
        assert!(!*pending.borrow());
    }

    #[tokio::test]
    async fn slippage_without_pool_fails() {
        let mut sender = MockTransactionSending::new();
        sender.expect_send().never();
        let mut controller = MarketOrderController::new(
            services(
                MockChainRead::new(),
                sender,
                expect_notification(notification::SOMETHING_WENT_WRONG),
            ),
            VALIDITY,
            Some(50),
        )
        .unwrap();
        controller.core.form = form(Some(gno()), Some("1"), Some(dai()));

        assert_eq!(controller.swap().await, None);
    }

    #[test]
    fn slippage_above_full_amount_is_rejected() {
        let build = || {
            services(
                MockChainRead::new(),
                MockTransactionSending::new(),
                MockNotifier::new(),
            )
        };
        assert!(MarketOrderController::new(build(), VALIDITY, Some(10_001)).is_err());
        assert!(MarketOrderController::new(build(), VALIDITY, Some(u16::MAX)).is_err());
        assert!(MarketOrderController::new(build(), VALIDITY, Some(10_000)).is_ok());
    }

    #[tokio::test]
    async fn swap_is_pending_while_sending() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut sender = MockTransactionSending::new();
        let mut controller = MarketOrderController::new(
            services(
                MockChainRead::new(),
                MockTransactionSending::new(),
                expect_notification(notification::SWAP_SUBMITTED),
            ),
            VALIDITY,
            None,
        )
        .unwrap();
        let pending = controller.subscribe_pending();
        sender.expect_send().times(1).returning(move |_| {
            tx.send(*pending.borrow()).unwrap();
            Ok(vec![TxHash::repeat_byte(5)])
        });
        controller.core.services.sender = Arc::new(sender);
        controller.core.form = form(Some(dai()), Some("1"), Some(sushi()));

        assert!(controller.swap().await.is_some());
        assert!(rx.recv().unwrap());
        assert!(!controller.is_pending());
    }
}
