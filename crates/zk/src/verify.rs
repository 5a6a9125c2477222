// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ZkError;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Serialize)]
struct VerifyRequest {
    packed_list: String,
    account_addr: String,
    security_zone: u8,
    chain_id: u64,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: String,
    #[serde(default)]
    data: Option<Vec<VerifyResponseItem>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponseItem {
    ct_hash: String,
    signature: String,
}

/// A ciphertext handle signed by the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyResult {
    pub ct_hash: U256,
    pub signature: String,
}

/// Submit a serialized proven list to `{verifier_url}/verify`. Results are in input order.
pub async fn verify(
    client: &reqwest::Client,
    proof: &[u8],
    verifier_url: &str,
    account: Address,
    security_zone: u8,
    chain_id: u64,
) -> Result<Vec<VerifyResult>, ZkError> {
    let request = VerifyRequest {
        packed_list: hex::encode(proof),
        account_addr: format!("0x{}", hex::encode(account.as_slice())),
        security_zone,
        chain_id,
    };

    debug!(chain_id, security_zone, bytes = proof.len(), "Submitting proof");
    let response: VerifyResponse = client
        .post(format!("{verifier_url}/verify"))
        .json(&request)
        .send()
        .await
        .map_err(|e| ZkError::VerifyFailed(e.to_string()))?
        .json()
        .await
        .map_err(|e| ZkError::VerifyFailed(format!("unreadable response: {e}")))?;

    if response.status != "success" {
        return Err(ZkError::VerifyFailed(response.error.unwrap_or_else(|| {
            format!("verifier returned status '{}'", response.status)
        })));
    }

    response
        .data
        .ok_or_else(|| ZkError::VerifyFailed("response has no data".to_string()))?
        .into_iter()
        .map(|item| {
            let ct_hash = U256::from_str(&item.ct_hash).map_err(|e| {
                ZkError::VerifyFailed(format!("invalid ct_hash '{}': {e}", item.ct_hash))
            })?;
            Ok(VerifyResult {
                ct_hash,
                signature: item.signature,
            })
        })
        .collect()
}
