// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Read access to a host chain
#[async_trait]
pub trait PublicClient: Send + Sync {
    /// `None` when the node cannot report a chain id
    async fn get_chain_id(&self) -> Result<Option<u64>>;

    /// Execute a read-only contract call and return the raw return data
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

/// An account able to sign and send transactions
#[async_trait]
pub trait WalletClient: Send + Sync {
    async fn get_addresses(&self) -> Result<Vec<Address>>;

    /// Send a transaction and wait for it to be mined
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash>;
}

/// [`PublicClient`] over an alloy http provider.
#[derive(Clone)]
pub struct ProviderPublicClient {
    provider: DynProvider,
}

impl ProviderPublicClient {
    pub async fn connect(http_rpc_url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect(http_rpc_url)
            .await
            .with_context(|| format!("Could not connect to {http_rpc_url}"))?;
        Ok(Self {
            provider: provider.erased(),
        })
    }
}

#[async_trait]
impl PublicClient for ProviderPublicClient {
    async fn get_chain_id(&self) -> Result<Option<u64>> {
        Ok(Some(self.provider.get_chain_id().await?))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        Ok(self.provider.call(tx).await?)
    }
}

/// [`WalletClient`] backed by a local private key.
#[derive(Clone)]
pub struct ProviderWalletClient {
    provider: DynProvider,
    address: Address,
}

impl ProviderWalletClient {
    pub async fn connect(http_rpc_url: &str, private_key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = private_key.parse().context("Invalid private key")?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .with_cached_nonce_management()
            .connect(http_rpc_url)
            .await
            .with_context(|| format!("Could not connect to {http_rpc_url}"))?;
        Ok(Self {
            provider: provider.erased(),
            address,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl WalletClient for ProviderWalletClient {
    async fn get_addresses(&self) -> Result<Vec<Address>> {
        Ok(vec![self.address])
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash> {
        let tx = TransactionRequest::default()
            .with_from(self.address)
            .with_to(to)
            .with_input(data);
        let receipt = self
            .provider
            .send_transaction(tx)
            .await?
            .get_receipt()
            .await?;
        debug!(tx = %receipt.transaction_hash, "Transaction mined");
        Ok(receipt.transaction_hash)
    }
}
