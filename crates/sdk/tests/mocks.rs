// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod helpers;

use alloy::primitives::{address, U256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use cofhe_evm_helpers::signatures::recover_mock_proof_signer;
use cofhe_sdk::{create_client, CofheErrorCode, Encryptable, EncryptStep, PlatformDependencies};
use cofhe_test_helpers::{fake_ct_hash, FakeCofheServer, FakeWalletClient, FakeZkBackend};
use helpers::*;
use std::sync::Arc;

async fn mock_harness(deps: impl FnOnce(&FakeZkBackend) -> PlatformDependencies) -> Result<Harness> {
    let server = FakeCofheServer::start().await?;
    let backend = FakeZkBackend::new();
    let client = create_client(test_config(&server), deps(&backend))?;
    let h = Harness::with_client(server, backend, client, HARDHAT)?;
    h.connect().await?;
    Ok(h)
}

#[tokio::test]
async fn test_mock_chain_skips_the_network() -> Result<()> {
    let h = mock_harness(test_deps).await?;
    let (log, callback) = recording_callback();

    let inputs = h
        .client
        .encrypt_inputs(vec![Encryptable::uint128(100)])
        .set_step_callback(callback)
        .encrypt()
        .await
        .into_result()?;

    use EncryptStep::*;
    assert_eq!(
        step_sequence(&log),
        vec![
            (FetchKeys, true),
            (FetchKeys, false),
            (Pack, true),
            (Pack, false),
            (Prove, true),
            (Prove, false),
            (Verify, true),
            (Verify, false),
        ]
    );
    assert_eq!(h.server.total_hits(), 0);
    assert_eq!(h.backend.init_calls(), 0);
    assert_eq!(h.public.calls(), 1);

    let expected_hash = fake_ct_hash(U256::from(100), 6, ACCOUNT, 0, U256::from(HARDHAT));
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].ct_hash, expected_hash);
    assert_eq!(inputs[0].security_zone, 0);
    assert_eq!(
        h.wallet.inserts(),
        vec![(
            h.client.config().mocks.zk_verifier_address,
            vec![expected_hash],
            vec![U256::from(100)]
        )]
    );
    Ok(())
}

#[tokio::test]
async fn test_mock_signatures_come_from_the_verifier_key() -> Result<()> {
    let h = mock_harness(test_deps).await?;
    let items = vec![Encryptable::bool(true), Encryptable::uint32(42)];

    let inputs = h
        .client
        .encrypt_inputs(items)
        .set_security_zone(1)
        .encrypt()
        .await
        .into_result()?;

    let verifier_signer: PrivateKeySigner = h.client.config().mocks.zk_verifier_signer_key.parse()?;
    for input in &inputs {
        assert_eq!(input.security_zone, 1);
        assert_eq!(
            recover_mock_proof_signer(&input.signature, input.ct_hash, 1, input.utype)?,
            verifier_signer.address()
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_zkv_signer_pays_for_the_insert() -> Result<()> {
    let signer = Arc::new(FakeWalletClient::new(address!(
        "0x00000000000000000000000000000000000000aa"
    )));
    let zkv_signer = signer.clone();
    let h = mock_harness(move |backend| PlatformDependencies {
        zkv_signer: Some(zkv_signer),
        ..test_deps(backend)
    })
    .await?;

    h.client
        .encrypt_inputs(vec![Encryptable::uint8(1)])
        .encrypt()
        .await
        .into_result()?;

    assert_eq!(signer.inserts().len(), 1);
    assert!(h.wallet.inserts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mock_failures_carry_their_codes() -> Result<()> {
    let h = mock_harness(test_deps).await?;

    let result = h
        .client
        .encrypt_inputs(vec![Encryptable::uint8(1)])
        .set_account(ACCOUNT)
        .encrypt()
        .await;
    assert!(result.success());

    let failing_wallet = Arc::new(FakeWalletClient::new(ACCOUNT).rejecting_transactions());
    h.client
        .connect(h.public.clone(), failing_wallet)
        .await
        .into_result()?;
    let result = h
        .client
        .encrypt_inputs(vec![Encryptable::uint8(1)])
        .encrypt()
        .await;
    assert_failed(&result, CofheErrorCode::ZkMocksInsertCtHashesFailed);
    Ok(())
}

#[tokio::test]
async fn test_mock_chain_needs_a_connected_client() -> Result<()> {
    let server = FakeCofheServer::start().await?;
    let backend = FakeZkBackend::new();
    let client = create_client(test_config(&server), test_deps(&backend))?;

    let result = client
        .encrypt_inputs(vec![Encryptable::uint8(1)])
        .set_account(ACCOUNT)
        .set_chain_id(HARDHAT)
        .encrypt()
        .await;

    assert_failed(&result, CofheErrorCode::NotConnected);
    Ok(())
}
