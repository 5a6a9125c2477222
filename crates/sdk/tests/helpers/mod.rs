// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

#![allow(dead_code)]

use alloy::primitives::{address, Address};
use anyhow::Result;
use cofhe_sdk::{
    create_client, ChainConfig, CofheClient, CofheConfig, CofheErrorCode, CofheResult,
    EncryptStep, PlatformDependencies, StepContext,
};
use cofhe_test_helpers::{
    FakeCofheServer, FakeKeyDeserializer, FakePublicClient, FakeWalletClient, FakeZkBackend,
};
use std::sync::{Arc, Mutex};

pub const ACCOUNT: Address = address!("0x1234567890123456789012345678901234567890");
pub const SEPOLIA: u64 = 11155111;
pub const HARDHAT: u64 = 31337;

pub fn chain_with_server(name: &str, chain_id: u64, server: &FakeCofheServer) -> ChainConfig {
    ChainConfig::new(name, chain_id)
        .with_cofhe_url(server.url())
        .with_verifier_url(server.url())
        .with_threshold_network_url(server.url())
}

/// Chain 1 and the local test chain served by `server`, proving inline
pub fn test_config(server: &FakeCofheServer) -> CofheConfig {
    let mut config = CofheConfig::default()
        .with_chain(chain_with_server("mainnet", 1, server))
        .with_chain(ChainConfig::new("hardhat", HARDHAT));
    config.use_worker = false;
    config
}

pub fn test_deps(backend: &FakeZkBackend) -> PlatformDependencies {
    PlatformDependencies {
        zk_backend: Some(Arc::new(backend.clone())),
        key_deserializer: Some(Arc::new(FakeKeyDeserializer::new())),
        ..Default::default()
    }
}

pub struct Harness {
    pub server: FakeCofheServer,
    pub backend: FakeZkBackend,
    pub client: CofheClient,
    pub public: Arc<FakePublicClient>,
    pub wallet: Arc<FakeWalletClient>,
}

impl Harness {
    pub async fn new() -> Result<Self> {
        let server = FakeCofheServer::start().await?;
        let backend = FakeZkBackend::new();
        let client = create_client(test_config(&server), test_deps(&backend))?;
        Self::with_client(server, backend, client, 1)
    }

    pub fn with_client(
        server: FakeCofheServer,
        backend: FakeZkBackend,
        client: CofheClient,
        chain_id: u64,
    ) -> Result<Self> {
        Ok(Self {
            server,
            backend,
            client,
            public: Arc::new(FakePublicClient::new(chain_id)),
            wallet: Arc::new(FakeWalletClient::new(ACCOUNT)),
        })
    }

    /// Connect the fake clients and wait for the outcome
    pub async fn connect(&self) -> Result<()> {
        self.client
            .connect(self.public.clone(), self.wallet.clone())
            .await
            .into_result()?;
        Ok(())
    }
}

pub fn assert_failed<T: std::fmt::Debug>(result: &CofheResult<T>, code: CofheErrorCode) {
    assert!(!result.success(), "expected {code}, got {result:?}");
    assert!(result.data().is_none());
    assert_eq!(result.error().map(|e| e.code), Some(code), "{result:?}");
}

pub type StepLog = Arc<Mutex<Vec<(EncryptStep, StepContext)>>>;

/// Callback that appends every report to the returned log
pub fn recording_callback() -> (
    StepLog,
    impl Fn(EncryptStep, &StepContext) + Send + Sync + 'static,
) {
    let log = StepLog::default();
    let sink = log.clone();
    (log, move |step: EncryptStep, context: &StepContext| {
        sink.lock().unwrap().push((step, context.clone()));
    })
}

/// `(step, is_start)` pairs in firing order
pub fn step_sequence(log: &StepLog) -> Vec<(EncryptStep, bool)> {
    log.lock()
        .unwrap()
        .iter()
        .map(|(step, context)| (*step, context.is_start))
        .collect()
}
