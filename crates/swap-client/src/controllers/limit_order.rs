use {
    super::{FormCore, OrderForm, Services},
    crate::{
        notification::{self, Notification},
        order::{Order, now_in_seconds, order_book_order},
        traits::{DigestSigning, OrderHashing, Transaction, TransactionSending},
        web3::Spender,
    },
    alloy::{
        primitives::{Address, TxHash, U256},
        sol_types::SolCall,
    },
    anyhow::{Context, Result},
    contracts::alloy::OrderBook::OrderBook::createOrderCall,
    number::units::parse_units,
    std::{
        ops::{Deref, DerefMut},
        sync::Arc,
    },
};

/// Where signed orders are submitted. The order book may live on a
/// different network than the one the swaps settle on.
#[derive(Clone)]
pub struct OrderBookNetwork {
    pub maker: Arc<dyn DigestSigning>,
    pub hasher: Arc<dyn OrderHashing>,
    pub order_book: Address,
    pub sender: Arc<dyn TransactionSending>,
}

pub struct LimitOrderController {
    core: FormCore,
    network: OrderBookNetwork,
}

impl LimitOrderController {
    pub fn new(services: Services, network: OrderBookNetwork) -> Self {
        Self {
            core: FormCore::new(services, Spender::Settlement),
            network,
        }
    }

    /// Signs an order selling the entered amount of the first token for at
    /// least `min_out` of the second and submits it to the order book. The
    /// proceeds go to the user's account.
    pub async fn create_order(&mut self) -> Option<TxHash> {
        let web3 = &self.core.services.web3;
        let erc20_only = match self.core.form.tokens() {
            Ok((one, two)) => !web3.is_native(one) && !web3.is_native(two),
            Err(_) => true,
        };
        if !erc20_only {
            self.core.notify(Notification::error(notification::ONLY_ERC20));
            return None;
        }

        self.core.set_pending(true);
        let result = self.submit(&self.core.form).await;
        self.core.set_pending(false);
        self.core.need_approve_token = false;
        match result {
            Ok(hash) => {
                tracing::info!(?hash, "limit order created");
                self.core
                    .notify(Notification::success(notification::ORDER_SUBMITTED));
                Some(hash)
            }
            Err(err) => {
                tracing::error!(?err, "could not create limit order");
                self.core
                    .notify(Notification::error(notification::SOMETHING_WENT_WRONG));
                None
            }
        }
    }

    async fn submit(&self, form: &OrderForm) -> Result<TxHash> {
        let (one, two) = form.tokens()?;
        let amount_in = parse_units(form.amount()?, one.decimals)?;
        let min_out = form.min_out.as_deref().context("no minimum out entered")?;
        let amount_out_min = parse_units(min_out, two.decimals)?;

        let mut order = Order::new(
            self.network.maker.clone(),
            self.network.hasher.clone(),
            one.address,
            two.address,
            amount_in,
            amount_out_min,
            self.core.services.web3.account(),
        );
        order.ensure_not_expired(now_in_seconds())?;
        let args = order.to_args().await?;
        tracing::debug!(?args, "submitting limit order");

        let call = createOrderCall {
            order: order_book_order(args),
        };
        let transaction = Transaction {
            to: self.network.order_book,
            data: call.abi_encode().into(),
            value: U256::ZERO,
        };
        let hashes = self.network.sender.send(vec![transaction]).await?;
        hashes.into_iter().next().context("no order transaction sent")
    }
}

impl Deref for LimitOrderController {
    type Target = FormCore;

    fn deref(&self) -> &FormCore {
        &self.core
    }
}

impl DerefMut for LimitOrderController {
    fn deref_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }
}
