//! Limit orders: hashing, signing and conversion into order book arguments.

use {
    crate::traits::{DigestSigning, OrderHashing},
    alloy::primitives::{Address, B256, U256},
    anyhow::{Context, Result, ensure},
    contracts::alloy::OrderBook,
    model::{
        order::{OrderArgs, OrderData},
        signature::EcdsaSignature,
    },
    std::{sync::Arc, time::Duration},
};

/// How long an order stays fillable unless a deadline is given.
pub const DEFAULT_ORDER_VALIDITY: Duration = Duration::from_secs(24 * 60 * 60);

/// Current unix time in seconds.
pub fn now_in_seconds() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

pub struct Order {
    maker: Arc<dyn DigestSigning>,
    hasher: Arc<dyn OrderHashing>,
    pub from_token: Address,
    pub to_token: Address,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub recipient: Address,
    pub deadline: U256,
    /// The signature together with the data it was made for.
    signature: Option<(EcdsaSignature, OrderData)>,
    pub filled_amount_in: Option<U256>,
    pub canceled: bool,
}

impl Order {
    pub fn new(
        maker: Arc<dyn DigestSigning>,
        hasher: Arc<dyn OrderHashing>,
        from_token: Address,
        to_token: Address,
        amount_in: U256,
        amount_out_min: U256,
        recipient: Address,
    ) -> Self {
        Self {
            maker,
            hasher,
            from_token,
            to_token,
            amount_in,
            amount_out_min,
            recipient,
            deadline: U256::from(now_in_seconds() + DEFAULT_ORDER_VALIDITY.as_secs()),
            signature: None,
            filled_amount_in: None,
            canceled: false,
        }
    }

    pub fn with_deadline(mut self, deadline: U256) -> Self {
        self.deadline = deadline;
        self
    }

    /// Reuses an existing signature for the order as built so far. Unless all
    /// of `v`, `r` and `s` are given the order gets signed again when its
    /// arguments are built.
    pub fn with_signature(mut self, v: Option<u8>, r: Option<B256>, s: Option<B256>) -> Self {
        self.signature = EcdsaSignature::from_parts(v, r, s).map(|sig| (sig, self.data()));
        if self.signature.is_none() && (v.is_some() || r.is_some() || s.is_some()) {
            tracing::warn!(?v, ?r, ?s, "ignoring incomplete order signature");
        }
        self
    }

    pub fn maker(&self) -> Address {
        self.maker.address()
    }

    /// The current signature, unless the order changed since it was signed.
    pub fn signature(&self) -> Option<EcdsaSignature> {
        let data = self.data();
        self.signature
            .filter(|(_, signed)| *signed == data)
            .map(|(signature, _)| signature)
    }

    pub fn data(&self) -> OrderData {
        OrderData {
            maker: self.maker(),
            from_token: self.from_token,
            to_token: self.to_token,
            amount_in: self.amount_in,
            amount_out_min: self.amount_out_min,
            recipient: self.recipient,
            deadline: self.deadline,
        }
    }

    pub async fn hash(&self) -> Result<B256> {
        self.hasher.hash_of_order(&self.data()).await
    }

    /// Signs the order's hash with the maker's key. Failures are logged and
    /// yield `None`.
    pub async fn sign(&self) -> Option<EcdsaSignature> {
        match self.try_sign().await {
            Ok(signature) => Some(signature),
            Err(err) => {
                tracing::error!(?err, "failed to sign order");
                None
            }
        }
    }

    async fn try_sign(&self) -> Result<EcdsaSignature> {
        let hash = self.hash().await?;
        self.maker.sign_digest(hash).await
    }

    /// The arguments the order book expects, signing the order first if it
    /// doesn't carry a signature for its current data.
    pub async fn to_args(&mut self) -> Result<OrderArgs> {
        let data = self.data();
        let signature = match self.signature() {
            Some(signature) => signature,
            None => {
                let signature = self.sign().await.context("order could not be signed")?;
                self.signature = Some((signature, data));
                signature
            }
        };
        Ok(OrderArgs { data, signature })
    }

    /// Drops the current signature so the next [`Order::to_args`] signs again.
    pub fn resign(&mut self) {
        self.signature = None;
    }

    pub fn ensure_not_expired(&self, now: u64) -> Result<()> {
        ensure!(
            self.data().is_valid_at(now),
            "order deadline {} is not in the future",
            self.deadline
        );
        Ok(())
    }
}

/// The struct `OrderBook.createOrder` takes.
pub fn order_book_order(args: OrderArgs) -> OrderBook::OrderBook::Order {
    OrderBook::OrderBook::Order {
        maker: args.data.maker,
        fromToken: args.data.from_token,
        toToken: args.data.to_token,
        amountIn: args.data.amount_in,
        amountOutMin: args.data.amount_out_min,
        recipient: args.data.recipient,
        deadline: args.data.deadline,
        v: args.signature.v,
        r: args.signature.r,
        s: args.signature.s,
    }
}
