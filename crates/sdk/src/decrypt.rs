// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ClientContext;
use crate::permits::invalid_permit;
use crate::{result_wrapper, CofheError, CofheErrorCode, CofheResult, Permit};
use alloy::primitives::{Address, U256};
use cofhe_types::{EncryptedPayload, FheType, UnsealedValue};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct SealOutputRequest {
    ct_tempkey: String,
    host_chain_id: u64,
    permit: Value,
}

#[derive(Debug, Deserialize)]
struct SealOutputResponse {
    #[serde(default)]
    sealed: Option<EncryptedPayload>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Ask the threshold network to re-encrypt `ct_hash` for the holder of `permission`.
pub async fn seal_output(
    client: &reqwest::Client,
    threshold_network_url: &str,
    ct_hash: U256,
    chain_id: u64,
    permission: Value,
) -> Result<EncryptedPayload, CofheError> {
    let request = SealOutputRequest {
        ct_tempkey: hex::encode(ct_hash.to_be_bytes::<32>()),
        host_chain_id: chain_id,
        permit: permission,
    };

    let failed = |message: String| {
        CofheError::new(CofheErrorCode::SealOutputFailed, message)
            .with_context(json!({ "ct_hash": ct_hash.to_string(), "chain_id": chain_id }))
    };

    let response: SealOutputResponse = client
        .post(format!("{threshold_network_url}/sealoutput"))
        .json(&request)
        .send()
        .await
        .map_err(|e| failed("Seal output request failed".to_string()).with_cause(e))?
        .json()
        .await
        .map_err(|e| failed("Seal output response is not readable".to_string()).with_cause(e))?;

    if let Some(message) = response.error_message {
        return Err(failed(format!("Threshold network refused to seal: {message}")));
    }
    response.sealed.ok_or_else(|| {
        CofheError::new(
            CofheErrorCode::SealOutputReturnedNull,
            "Threshold network returned no sealed output",
        )
        .with_context(json!({ "ct_hash": ct_hash.to_string(), "chain_id": chain_id }))
    })
}

/// Builder for unsealing one ciphertext handle.
pub struct DecryptBuilder {
    ct_hash: U256,
    utype: FheType,
    chain_id: Option<u64>,
    account: Option<Address>,
    permit_hash: Option<String>,
    permit: Option<Arc<dyn Permit>>,
    ctx: Arc<ClientContext>,
}

impl DecryptBuilder {
    pub(crate) fn new(ctx: Arc<ClientContext>, ct_hash: U256, utype: FheType) -> Self {
        Self {
            ct_hash,
            utype,
            chain_id: None,
            account: None,
            permit_hash: None,
            permit: None,
            ctx,
        }
    }

    /// Chain used to look up the active permit. The seal request itself always targets the
    /// permit's own chain.
    pub fn set_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn set_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn set_permit_hash(mut self, hash: impl Into<String>) -> Self {
        self.permit_hash = Some(hash.into());
        self
    }

    pub fn set_permit(mut self, permit: Arc<dyn Permit>) -> Self {
        self.permit = Some(permit);
        self
    }

    pub async fn decrypt(&self) -> CofheResult<UnsealedValue> {
        result_wrapper(self.run()).await
    }

    async fn run(&self) -> Result<UnsealedValue, CofheError> {
        self.ctx.await_connection().await?;

        let permit = self.resolve_permit()?;
        permit.validate().map_err(invalid_permit)?;

        let chain_id = permit.chain_id();
        let chain = self.ctx.chain(chain_id)?;
        let url = chain.threshold_network_url.as_deref().ok_or_else(|| {
            CofheError::new(
                CofheErrorCode::ThresholdNetworkUrlUninitialized,
                format!("No threshold network url configured for chain {chain_id}"),
            )
            .with_hint("Set `threshold_network_url` for the chain in the cofhe config")
        })?;

        info!(chain_id, ct_hash = %self.ct_hash, "Requesting seal output");
        let sealed = seal_output(
            &self.ctx.http,
            url,
            self.ct_hash,
            chain_id,
            permit.permission(),
        )
        .await?;

        let raw = permit.unseal(&sealed).map_err(|e| {
            CofheError::new(
                CofheErrorCode::UnsealFailed,
                format!("Could not unseal output: {e:#}"),
            )
            .with_cause(e)
        })?;

        debug!(utype = %self.utype, "Converting unsealed value");
        UnsealedValue::from_raw(self.utype, raw).ok_or_else(|| {
            CofheError::new(
                CofheErrorCode::InvalidUtype,
                format!("utype {} cannot be decrypted", self.utype),
            )
            .with_context(json!({ "utype": self.utype }))
        })
    }

    /// Explicit permit, then lookup by hash, then the active permit. Exactly one path is taken.
    fn resolve_permit(&self) -> Result<Arc<dyn Permit>, CofheError> {
        if let Some(permit) = &self.permit {
            return Ok(permit.clone());
        }

        let chain_id = self.ctx.resolve_chain_id(self.chain_id)?;
        let account = self.ctx.resolve_account(self.account)?;
        let store = &self.ctx.permit_store;

        let found = match &self.permit_hash {
            Some(hash) => store.get_permit(chain_id, account, hash),
            None => store.get_active_permit(chain_id, account),
        }
        .map_err(|e| {
            CofheError::new(CofheErrorCode::PermitStoreFailed, format!("{e:#}")).with_cause(e)
        })?;

        found.ok_or_else(|| {
            let message = match &self.permit_hash {
                Some(hash) => format!("No permit {hash} for {account} on chain {chain_id}"),
                None => format!("No active permit for {account} on chain {chain_id}"),
            };
            CofheError::new(CofheErrorCode::PermitNotFound, message)
                .with_hint("Create a permit and store it with client.permits()")
        })
    }
}
