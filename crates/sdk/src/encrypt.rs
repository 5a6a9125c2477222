// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ClientContext;
use crate::{result_wrapper, CofheError, CofheErrorCode, CofheResult};
use alloy::primitives::Address;
use cofhe_types::{EncryptableItem, EncryptedItemInput, FheType};
use cofhe_zk::{
    check_bit_width, mocks, pack, plaintext_values, prove_with_fallback, verify, VerifyResult,
    ZkError, ZkMetadata,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum EncryptStep {
    InitTfhe,
    FetchKeys,
    Pack,
    Prove,
    Verify,
}

/// Progress report for one step. Every step is reported twice: at start with a zero duration
/// and at end with the elapsed time. Worker diagnostics are only set on [`EncryptStep::Prove`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepContext {
    pub is_start: bool,
    pub is_end: bool,
    pub duration_ms: u64,
    pub use_worker: Option<bool>,
    pub used_worker: Option<bool>,
    pub worker_failed_error: Option<String>,
}

pub type StepCallback = Arc<dyn Fn(EncryptStep, &StepContext) + Send + Sync>;

/// Builder for encrypting a batch of plaintexts into chain-ready inputs.
///
/// Setters never fail. Every check runs inside [`EncryptBuilder::encrypt`].
#[derive(Clone)]
pub struct EncryptBuilder {
    items: Vec<EncryptableItem>,
    account: Option<Address>,
    chain_id: Option<u64>,
    security_zone: u8,
    step_callback: Option<StepCallback>,
    use_worker: Option<bool>,
    ctx: Arc<ClientContext>,
}

impl EncryptBuilder {
    pub(crate) fn new(ctx: Arc<ClientContext>, items: Vec<EncryptableItem>) -> Self {
        Self {
            items,
            account: None,
            chain_id: None,
            security_zone: 0,
            step_callback: None,
            use_worker: None,
            ctx,
        }
    }

    pub fn set_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn set_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn set_security_zone(mut self, security_zone: u8) -> Self {
        self.security_zone = security_zone;
        self
    }

    pub fn set_step_callback(
        mut self,
        callback: impl Fn(EncryptStep, &StepContext) + Send + Sync + 'static,
    ) -> Self {
        self.step_callback = Some(Arc::new(callback));
        self
    }

    /// Overrides `use_worker` from the config for this batch
    pub fn set_use_worker(mut self, use_worker: bool) -> Self {
        self.use_worker = Some(use_worker);
        self
    }

    pub async fn encrypt(&self) -> CofheResult<Vec<EncryptedItemInput>> {
        result_wrapper(self.run()).await
    }

    async fn run(&self) -> Result<Vec<EncryptedItemInput>, CofheError> {
        self.ctx.await_connection().await?;

        let account = self.ctx.resolve_account(self.account)?;
        let chain_id = self.ctx.resolve_chain_id(self.chain_id)?;
        check_bit_width(&self.items)?;

        if self.ctx.config.is_mock_chain(chain_id) {
            return self.encrypt_mocks(account, chain_id).await;
        }

        let sz = self.security_zone;
        info!(chain_id, security_zone = sz, items = self.items.len(), "Encrypting inputs");

        let started = self.step_start(EncryptStep::InitTfhe, StepContext::default());
        let backend = self.ctx.zk_backend.clone().ok_or_else(|| {
            CofheError::new(CofheErrorCode::MissingZkBackend, "No zk backend provided")
                .with_hint("Pass a zk_backend in the platform dependencies")
        })?;
        backend
            .init()
            .await
            .map_err(|e| ZkError::InitFailed(format!("{e:#}")))?;
        self.step_end(EncryptStep::InitTfhe, started, StepContext::default());

        let started = self.step_start(EncryptStep::FetchKeys, StepContext::default());
        let verifier_url = self
            .ctx
            .chain(chain_id)?
            .verifier_url
            .clone()
            .ok_or_else(|| {
                CofheError::new(
                    CofheErrorCode::ZkVerifierUrlUninitialized,
                    format!("No verifier url configured for chain {chain_id}"),
                )
                .with_hint("Set `verifier_url` for the chain in the cofhe config")
            })?;
        let fetcher = self.ctx.key_fetcher.as_ref().ok_or_else(|| {
            CofheError::new(
                CofheErrorCode::MissingKeyDeserializer,
                "No key deserializer provided",
            )
            .with_hint("Pass a key_deserializer in the platform dependencies")
        })?;
        let keys = fetcher.fetch_keys(&self.ctx.config, chain_id, sz).await?;
        if keys.fhe_public_key.is_empty() {
            return Err(CofheError::new(
                CofheErrorCode::PublicKeyUninitialized,
                format!("No fhe public key for chain {chain_id} security zone {sz}"),
            ));
        }
        if keys.crs.is_empty() {
            return Err(CofheError::new(
                CofheErrorCode::CrsUninitialized,
                format!("No crs for chain {chain_id}"),
            ));
        }
        let builder = backend
            .builder(&keys.fhe_public_key)
            .map_err(|e| ZkError::InvalidKeyMaterial(format!("fhe public key: {e:#}")))?;
        let crs = backend
            .crs(&keys.crs)
            .map_err(|e| ZkError::InvalidKeyMaterial(format!("crs: {e:#}")))?;
        self.step_end(EncryptStep::FetchKeys, started, StepContext::default());

        let started = self.step_start(EncryptStep::Pack, StepContext::default());
        let builder = pack(&self.items, builder)?;
        self.step_end(EncryptStep::Pack, started, StepContext::default());

        let use_worker = self.use_worker.unwrap_or(self.ctx.config.use_worker);
        let prove_context = StepContext {
            use_worker: Some(use_worker),
            ..Default::default()
        };
        let started = self.step_start(EncryptStep::Prove, prove_context.clone());
        let worker = self
            .ctx
            .worker_prover
            .as_deref()
            .filter(|_| use_worker);
        let metadata = ZkMetadata::new(account, sz, chain_id).to_bytes();
        let outcome = prove_with_fallback(builder, crs, metadata, worker).await?;
        self.step_end(
            EncryptStep::Prove,
            started,
            StepContext {
                used_worker: Some(outcome.used_worker),
                worker_failed_error: outcome.worker_failed_error,
                ..prove_context
            },
        );

        let started = self.step_start(EncryptStep::Verify, StepContext::default());
        let results = verify(
            &self.ctx.http,
            &outcome.proof,
            &verifier_url,
            account,
            sz,
            chain_id,
        )
        .await?;
        self.step_end(EncryptStep::Verify, started, StepContext::default());

        self.reassemble(results)
    }

    /// Local test chain: handles come from the mock verifier contract instead of the network.
    async fn encrypt_mocks(
        &self,
        account: Address,
        chain_id: u64,
    ) -> Result<Vec<EncryptedItemInput>, CofheError> {
        let sz = self.security_zone;
        let mocks_config = &self.ctx.config.mocks;
        let delay = Duration::from_millis(mocks_config.step_delay_ms);
        info!(chain_id, security_zone = sz, items = self.items.len(), "Encrypting inputs with mocks");

        let public = self.ctx.connection.public_client().ok_or_else(|| {
            CofheError::new(
                CofheErrorCode::NotConnected,
                "Encrypting on the mock chain needs a connected public client",
            )
            .with_hint("Call connect() first")
        })?;

        let started = self.step_start(EncryptStep::FetchKeys, StepContext::default());
        pause(delay).await;
        self.step_end(EncryptStep::FetchKeys, started, StepContext::default());

        let started = self.step_start(EncryptStep::Pack, StepContext::default());
        let values = plaintext_values(&self.items)?;
        let utypes: Vec<FheType> = self.items.iter().map(|item| item.utype).collect();
        pause(delay).await;
        self.step_end(EncryptStep::Pack, started, StepContext::default());

        let prove_context = StepContext {
            use_worker: Some(false),
            used_worker: Some(false),
            ..Default::default()
        };
        let started = self.step_start(EncryptStep::Prove, prove_context.clone());
        let ct_hashes = mocks::calc_ct_hashes(
            public.as_ref(),
            mocks_config.zk_verifier_address,
            &values,
            &utypes,
            account,
            sz,
            chain_id,
        )
        .await?;
        let signed = mocks::create_proof_signatures(
            &mocks_config.zk_verifier_signer_key,
            &ct_hashes,
            &utypes,
            sz,
        )?;
        self.step_end(EncryptStep::Prove, started, prove_context);

        let started = self.step_start(EncryptStep::Verify, StepContext::default());
        let sender = self
            .ctx
            .zkv_signer
            .clone()
            .or_else(|| self.ctx.connection.wallet_client())
            .ok_or_else(|| {
                CofheError::new(
                    CofheErrorCode::SenderUninitialized,
                    "No signer available to record mock ct hashes",
                )
                .with_hint("Connect a wallet client or provide a zkv_signer")
            })?;
        mocks::insert_ct_hashes(
            sender.as_ref(),
            mocks_config.zk_verifier_address,
            &ct_hashes,
            &values,
        )
        .await?;
        self.step_end(EncryptStep::Verify, started, StepContext::default());

        self.reassemble(signed)
    }

    /// Pair each verified handle with the item it came from, by position.
    fn reassemble(&self, results: Vec<VerifyResult>) -> Result<Vec<EncryptedItemInput>, CofheError> {
        let expected = self.items.len();
        let received = results.len();
        if received > expected {
            return Err(CofheError::new(
                CofheErrorCode::ZkVerifyFailed,
                format!("Verifier returned {received} results for {expected} items"),
            )
            .with_context(json!({ "expected": expected, "received": received })));
        }
        if received < expected {
            return Err(CofheError::new(
                CofheErrorCode::EncryptRemainingItems,
                format!(
                    "{} of {expected} items were not returned by the verifier",
                    expected - received
                ),
            )
            .with_context(json!({ "expected": expected, "received": received })));
        }

        Ok(self
            .items
            .iter()
            .zip(results)
            .map(|(item, result)| EncryptedItemInput {
                ct_hash: result.ct_hash,
                security_zone: self.security_zone,
                utype: item.utype,
                signature: result.signature,
            })
            .collect())
    }

    fn step_start(&self, step: EncryptStep, context: StepContext) -> Instant {
        debug!(%step, "Step started");
        if let Some(callback) = &self.step_callback {
            callback(
                step,
                &StepContext {
                    is_start: true,
                    is_end: false,
                    duration_ms: 0,
                    ..context
                },
            );
        }
        Instant::now()
    }

    fn step_end(&self, step: EncryptStep, started: Instant, context: StepContext) {
        let duration_ms = started.elapsed().as_millis() as u64;
        debug!(%step, duration_ms, "Step finished");
        if let Some(callback) = &self.step_callback {
            callback(
                step,
                &StepContext {
                    is_start: false,
                    is_end: true,
                    duration_ms,
                    ..context
                },
            );
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
