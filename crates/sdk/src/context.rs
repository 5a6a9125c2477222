// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CofheError, CofheErrorCode, ConnectionStore, PermitStore};
use alloy::primitives::Address;
use cofhe_config::{ChainConfig, CofheConfig};
use cofhe_evm_helpers::WalletClient;
use cofhe_keys::{KeyFetcher, KeysStore};
use cofhe_zk::{Prover, ZkBackend};
use std::sync::Arc;

/// Everything the builders share with the client that created them.
pub(crate) struct ClientContext {
    pub config: Arc<CofheConfig>,
    pub connection: Arc<ConnectionStore>,
    pub keys: Arc<KeysStore>,
    pub key_fetcher: Option<KeyFetcher>,
    pub zk_backend: Option<Arc<dyn ZkBackend>>,
    pub permit_store: Arc<dyn PermitStore>,
    pub zkv_signer: Option<Arc<dyn WalletClient>>,
    pub worker_prover: Option<Arc<dyn Prover>>,
    pub http: reqwest::Client,
}

impl ClientContext {
    /// Wait for a connection attempt in flight and surface its failure.
    pub async fn await_connection(&self) -> Result<(), CofheError> {
        if let Some(pending) = self.connection.pending() {
            pending.await.into_result()?;
        }
        Ok(())
    }

    pub fn resolve_account(&self, account: Option<Address>) -> Result<Address, CofheError> {
        account
            .or(self.connection.snapshot().account)
            .ok_or_else(|| {
                CofheError::new(
                    CofheErrorCode::AccountUninitialized,
                    "No account set and no wallet connected",
                )
                .with_hint("Call connect() or set the account explicitly")
            })
    }

    pub fn resolve_chain_id(&self, chain_id: Option<u64>) -> Result<u64, CofheError> {
        chain_id
            .or(self.connection.snapshot().chain_id)
            .ok_or_else(|| {
                CofheError::new(
                    CofheErrorCode::ChainIdUninitialized,
                    "No chain id set and no client connected",
                )
                .with_hint("Call connect() or set the chain id explicitly")
            })
    }

    pub fn chain(&self, chain_id: u64) -> Result<&ChainConfig, CofheError> {
        self.config.chain(chain_id).ok_or_else(|| {
            CofheError::new(
                CofheErrorCode::UnsupportedChain,
                format!("Chain {chain_id} is not configured"),
            )
            .with_hint("Add the chain to `chains` in the cofhe config")
        })
    }
}
