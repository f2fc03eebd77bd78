//! Implementations of the trait seams that talk to a node.

use {
    crate::traits::{ChainRead, DigestSigning, OrderHashing, Transaction, TransactionSending},
    alloy::{
        network::{ReceiptResponse, TransactionBuilder},
        primitives::{Address, B256, TxHash, U256},
        providers::Provider,
        rpc::types::TransactionRequest,
        signers::{Signer, local::PrivateKeySigner},
    },
    anyhow::{Context, Result, ensure},
    contracts::alloy::{ERC20, Settlement},
    ethrpc::{AlloyProvider, Web3},
    model::{order::OrderData, signature::EcdsaSignature},
    tracing::instrument,
};

/// Reads balances and allowances from the node.
pub struct OnchainReader {
    web3: Web3,
}

impl OnchainReader {
    pub fn new(web3: Web3) -> Self {
        Self { web3 }
    }
}

#[async_trait::async_trait]
impl ChainRead for OnchainReader {
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        ERC20::Instance::new(token, self.web3.provider.clone())
            .allowance(owner, spender)
            .call()
            .await
            .with_context(|| format!("could not fetch allowance of token {token}"))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        ERC20::Instance::new(token, self.web3.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .with_context(|| format!("could not fetch balance of token {token}"))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.web3
            .provider
            .get_balance(owner)
            .await
            .context("could not fetch native balance")
    }
}

/// Hashes orders by asking the settlement contract.
pub struct SettlementHasher {
    settlement: Settlement::Instance,
}

impl SettlementHasher {
    pub fn new(settlement: Settlement::Instance) -> Self {
        Self { settlement }
    }
}

#[async_trait::async_trait]
impl OrderHashing for SettlementHasher {
    async fn hash_of_order(&self, order: &OrderData) -> Result<B256> {
        self.settlement
            .hashOfOrder(
                order.maker,
                order.from_token,
                order.to_token,
                order.amount_in,
                order.amount_out_min,
                order.recipient,
                order.deadline,
            )
            .call()
            .await
            .context("hashOfOrder call failed")
    }
}

#[async_trait::async_trait]
impl DigestSigning for PrivateKeySigner {
    fn address(&self) -> Address {
        Signer::address(self)
    }

    async fn sign_digest(&self, digest: B256) -> Result<EcdsaSignature> {
        let signature = self
            .sign_message(digest.as_slice())
            .await
            .context("could not sign order digest")?;
        Ok(signature.into())
    }
}

/// Sends transactions through a provider that holds the account's key.
pub struct WalletSender {
    provider: AlloyProvider,
    sender: Address,
}

impl WalletSender {
    pub fn new(provider: AlloyProvider, sender: Address) -> Self {
        Self { provider, sender }
    }
}

#[async_trait::async_trait]
impl TransactionSending for WalletSender {
    #[instrument(skip_all, fields(count = transactions.len()))]
    async fn send(&self, transactions: Vec<Transaction>) -> Result<Vec<TxHash>> {
        let mut hashes = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            let request = TransactionRequest::default()
                .with_from(self.sender)
                .with_to(transaction.to)
                .with_input(transaction.data)
                .with_value(transaction.value);
            let receipt = self
                .provider
                .send_transaction(request)
                .await
                .context("could not submit transaction")?
                .with_required_confirmations(1)
                .get_receipt()
                .await
                .context("could not fetch transaction receipt")?;
            let hash = receipt.transaction_hash();
            ensure!(receipt.status(), "transaction {hash} reverted");
            tracing::debug!(?hash, to = ?transaction.to, "transaction mined");
            hashes.push(hash);
        }
        Ok(hashes)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::b256};

    #[tokio::test]
    async fn signs_digests_as_personal_messages() {
        let signer = PrivateKeySigner::from_bytes(&b256!(
            "0101010101010101010101010101010101010101010101010101010101010101"
        ))
        .unwrap();
        let digest = b256!("c0ffee00000000000000000000000000000000000000000000000000000000aa");

        let signature = signer.sign_digest(digest).await.unwrap();

        assert!(signature.v == 27 || signature.v == 28);
        assert_eq!(
            signature.recover(&digest).unwrap(),
            DigestSigning::address(&signer)
        );
    }
}
