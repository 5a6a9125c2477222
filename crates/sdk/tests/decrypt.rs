// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod helpers;

use alloy::primitives::U256;
use anyhow::Result;
use cofhe_sdk::{create_client, ChainConfig, CofheErrorCode, FheType, UnsealedValue};
use cofhe_test_helpers::{FakeCofheServer, FakePermit, FakeZkBackend, SEAL_OUTPUT_ROUTE};
use helpers::*;
use serde_json::json;
use std::sync::Arc;

fn permit(hash: &str, chain_id: u64) -> Arc<FakePermit> {
    Arc::new(FakePermit::new(hash, ACCOUNT, chain_id))
}

#[tokio::test]
async fn test_decrypt_with_explicit_permit() -> Result<()> {
    let h = Harness::new().await?;
    h.connect().await?;

    let value = h
        .client
        .decrypt_handle(U256::from(100), FheType::Uint128)
        .set_permit(permit("p1", 1))
        .decrypt()
        .await
        .into_result()?;

    assert_eq!(value, UnsealedValue::Uint(U256::from(100)));
    let request = &h.server.requests(SEAL_OUTPUT_ROUTE)[0];
    assert_eq!(
        request["ct_tempkey"],
        format!("{}64", "0".repeat(62))
    );
    assert_eq!(request["host_chain_id"], 1);
    assert_eq!(request["permit"]["hash"], "p1");
    Ok(())
}

#[tokio::test]
async fn test_converts_by_utype() -> Result<()> {
    let h = Harness::new().await?;
    h.connect().await?;

    let value = h
        .client
        .decrypt_handle(U256::from(1), FheType::Bool)
        .set_permit(permit("p1", 1))
        .decrypt()
        .await
        .into_result()?;
    assert_eq!(value.as_bool(), Some(true));

    let as_handle = U256::from_be_slice(ACCOUNT.as_slice());
    let value = h
        .client
        .decrypt_handle(as_handle, FheType::Uint160)
        .set_permit(permit("p1", 1))
        .decrypt()
        .await
        .into_result()?;
    assert_eq!(value.as_address(), Some(ACCOUNT));

    let result = h
        .client
        .decrypt_handle(U256::from(1), FheType::Uint2048)
        .set_permit(permit("p1", 1))
        .decrypt()
        .await;
    assert_failed(&result, CofheErrorCode::InvalidUtype);
    Ok(())
}

#[tokio::test]
async fn test_seal_request_targets_the_permit_chain() -> Result<()> {
    let mainnet = FakeCofheServer::start().await?;
    let sepolia = FakeCofheServer::start().await?;
    let backend = FakeZkBackend::new();
    let config = test_config(&mainnet).with_chain(chain_with_server("sepolia", SEPOLIA, &sepolia));
    let client = create_client(config, test_deps(&backend))?;
    let h = Harness::with_client(mainnet, backend, client, 1)?;
    h.connect().await?;

    h.client
        .decrypt_handle(U256::from(5), FheType::Uint8)
        .set_chain_id(1)
        .set_permit(permit("sepolia-permit", SEPOLIA))
        .decrypt()
        .await
        .into_result()?;

    assert_eq!(h.server.hits(SEAL_OUTPUT_ROUTE), 0);
    assert_eq!(sepolia.hits(SEAL_OUTPUT_ROUTE), 1);
    assert_eq!(
        sepolia.requests(SEAL_OUTPUT_ROUTE)[0]["host_chain_id"],
        SEPOLIA
    );
    Ok(())
}

#[tokio::test]
async fn test_permit_resolution_order() -> Result<()> {
    let h = Harness::new().await?;
    h.connect().await?;
    let permits = h.client.permits();
    permits.store_permit(permit("stored", 1)).await.into_result()?;
    permits.store_permit(permit("active", 1)).await.into_result()?;

    let result = h
        .client
        .decrypt_handle(U256::from(1), FheType::Uint8)
        .decrypt()
        .await;
    assert_failed(&result, CofheErrorCode::PermitNotFound);

    permits.set_active_permit("active").await.into_result()?;
    h.client
        .decrypt_handle(U256::from(1), FheType::Uint8)
        .decrypt()
        .await
        .into_result()?;

    h.client
        .decrypt_handle(U256::from(1), FheType::Uint8)
        .set_permit_hash("stored")
        .decrypt()
        .await
        .into_result()?;

    h.client
        .decrypt_handle(U256::from(1), FheType::Uint8)
        .set_permit_hash("stored")
        .set_permit(permit("explicit", 1))
        .decrypt()
        .await
        .into_result()?;

    let used: Vec<_> = h
        .server
        .requests(SEAL_OUTPUT_ROUTE)
        .iter()
        .map(|r| r["permit"]["hash"].clone())
        .collect();
    assert_eq!(used, vec![json!("active"), json!("stored"), json!("explicit")]);

    let result = h
        .client
        .decrypt_handle(U256::from(1), FheType::Uint8)
        .set_permit_hash("missing")
        .decrypt()
        .await;
    assert_failed(&result, CofheErrorCode::PermitNotFound);
    Ok(())
}

#[tokio::test]
async fn test_expired_permit() -> Result<()> {
    let h = Harness::new().await?;
    h.connect().await?;

    let result = h
        .client
        .decrypt_handle(U256::from(1), FheType::Uint8)
        .set_permit(Arc::new(FakePermit::new("old", ACCOUNT, 1).expired()))
        .decrypt()
        .await;

    assert_failed(&result, CofheErrorCode::InvalidPermitData);
    assert_eq!(h.server.total_hits(), 0);
    Ok(())
}

#[tokio::test]
async fn test_threshold_network_failures() -> Result<()> {
    let h = Harness::new().await?;
    h.connect().await?;
    let decrypt = || {
        h.client
            .decrypt_handle(U256::from(1), FheType::Uint8)
            .set_permit(permit("p1", 1))
    };

    h.server.set_response(
        SEAL_OUTPUT_ROUTE,
        json!({ "sealed": null, "error_message": "permit revoked" }),
    );
    let result = decrypt().decrypt().await;
    assert_failed(&result, CofheErrorCode::SealOutputFailed);
    assert!(result.error().unwrap().message.contains("permit revoked"));

    h.server.set_response(
        SEAL_OUTPUT_ROUTE,
        json!({ "sealed": null, "error_message": null }),
    );
    let result = decrypt().decrypt().await;
    assert_failed(&result, CofheErrorCode::SealOutputReturnedNull);

    h.server.set_response(
        SEAL_OUTPUT_ROUTE,
        json!({ "sealed": { "data": vec![1u8; 33], "public_key": [], "nonce": [] } }),
    );
    let result = decrypt().decrypt().await;
    assert_failed(&result, CofheErrorCode::UnsealFailed);
    Ok(())
}

#[tokio::test]
async fn test_chain_without_threshold_network() -> Result<()> {
    let server = FakeCofheServer::start().await?;
    let backend = FakeZkBackend::new();
    let config = test_config(&server).with_chain(ChainConfig::new("bare", 5));
    let client = create_client(config, test_deps(&backend))?;
    let h = Harness::with_client(server, backend, client, 1)?;
    h.connect().await?;

    let result = h
        .client
        .decrypt_handle(U256::from(1), FheType::Uint8)
        .set_permit(permit("p5", 5))
        .decrypt()
        .await;
    assert_failed(&result, CofheErrorCode::ThresholdNetworkUrlUninitialized);

    let result = h
        .client
        .decrypt_handle(U256::from(1), FheType::Uint8)
        .set_permit(permit("p9", 999))
        .decrypt()
        .await;
    assert_failed(&result, CofheErrorCode::UnsupportedChain);
    Ok(())
}
