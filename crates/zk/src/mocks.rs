// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Stand-in for pack/prove/verify on the local test chain. Handles come from the mock verifier
//! contract and are signed with the verifier's well known key, so the output has exactly the
//! shape the co-processor would return.

use crate::{VerifyResult, ZkError};
use alloy::{
    primitives::{Address, TxHash, U256},
    signers::local::PrivateKeySigner,
};
use cofhe_evm_helpers::{
    contracts::{calc_ct_hashes_calldata, decode_ct_hashes, insert_ct_hashes_calldata},
    signatures::sign_mock_proof,
    PublicClient, WalletClient,
};
use cofhe_types::FheType;
use tracing::debug;

/// Ask the mock verifier for the handles it would assign to `values`.
pub async fn calc_ct_hashes(
    client: &dyn PublicClient,
    verifier: Address,
    values: &[U256],
    utypes: &[FheType],
    account: Address,
    security_zone: u8,
    chain_id: u64,
) -> Result<Vec<U256>, ZkError> {
    let calldata = calc_ct_hashes_calldata(
        values.to_vec(),
        utypes.iter().map(|u| u.as_u8()).collect(),
        account,
        security_zone,
        chain_id,
    );
    let returned = client
        .call(verifier, calldata)
        .await
        .map_err(|e| ZkError::MocksCalcCtHashesFailed(format!("{e:#}")))?;
    let ct_hashes = decode_ct_hashes(&returned)
        .map_err(|e| ZkError::MocksCalcCtHashesFailed(format!("{e:#}")))?;

    if ct_hashes.len() != values.len() {
        return Err(ZkError::MocksCalcCtHashesFailed(format!(
            "expected {} ct hashes, got {}",
            values.len(),
            ct_hashes.len()
        )));
    }
    Ok(ct_hashes)
}

/// Record the plaintext behind each handle so the mock fhe contracts can resolve it.
pub async fn insert_ct_hashes(
    wallet: &dyn WalletClient,
    verifier: Address,
    ct_hashes: &[U256],
    values: &[U256],
) -> Result<TxHash, ZkError> {
    if ct_hashes.len() != values.len() {
        return Err(ZkError::MocksInsertCtHashesFailed(format!(
            "{} ct hashes for {} values",
            ct_hashes.len(),
            values.len()
        )));
    }
    let tx = wallet
        .send_transaction(
            verifier,
            insert_ct_hashes_calldata(ct_hashes.to_vec(), values.to_vec()),
        )
        .await
        .map_err(|e| ZkError::MocksInsertCtHashesFailed(format!("{e:#}")))?;
    debug!(%tx, count = ct_hashes.len(), "Inserted mock ct hashes");
    Ok(tx)
}

/// Sign every handle with the mock verifier key.
pub fn create_proof_signatures(
    signer_key: &str,
    ct_hashes: &[U256],
    utypes: &[FheType],
    security_zone: u8,
) -> Result<Vec<VerifyResult>, ZkError> {
    let signer: PrivateKeySigner = signer_key
        .parse()
        .map_err(|e| ZkError::MocksCreateProofSignatureFailed(format!("invalid key: {e}")))?;

    ct_hashes
        .iter()
        .zip(utypes)
        .map(|(ct_hash, utype)| {
            let signature = sign_mock_proof(&signer, *ct_hash, security_zone, *utype)
                .map_err(|e| ZkError::MocksCreateProofSignatureFailed(format!("{e:#}")))?;
            Ok(VerifyResult {
                ct_hash: *ct_hash,
                signature,
            })
        })
        .collect()
}
