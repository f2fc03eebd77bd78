//! Trait definitions for external system boundaries.
//!
//! These traits abstract blockchain and wallet interactions to enable
//! unit testing with mocks.

use {
    crate::notification::Notification,
    alloy::primitives::{Address, B256, Bytes, TxHash, U256},
    anyhow::Result,
    model::{order::OrderData, signature::EcdsaSignature},
};

/// Abstracts blockchain read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChainRead: Send + Sync {
    /// ERC-20 allowance `owner` granted to `spender` for `token`.
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// ERC-20 balance of `owner`.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256>;

    /// Native asset balance of `owner`.
    async fn native_balance(&self, owner: Address) -> Result<U256>;
}

/// Computes order digests. The settlement contract is the source of truth
/// for how an order is hashed.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OrderHashing: Send + Sync {
    async fn hash_of_order(&self, order: &OrderData) -> Result<B256>;
}

/// A key that signs raw 32 byte digests as personal messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DigestSigning: Send + Sync {
    fn address(&self) -> Address;

    async fn sign_digest(&self, digest: B256) -> Result<EcdsaSignature>;
}

/// A transaction ready to be signed by the sending account.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Transaction {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// Abstracts blockchain write operations (transaction submission).
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TransactionSending: Send + Sync {
    /// Sends the transactions one after another and waits for each of them to
    /// be mined successfully.
    async fn send(&self, transactions: Vec<Transaction>) -> Result<Vec<TxHash>>;
}

/// Shows transient messages to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
