// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::U256;
use anyhow::{bail, Result};
use async_trait::async_trait;
use cofhe_zk::{Prover, ZkBackend, ZkBuilder, ZkComputeLoad, ZkCrs, ZkError, ZkProvenList};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One pushed plaintext as the fake builder records it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakePackedItem {
    /// `1` for booleans
    pub bits: u32,
    pub value: U256,
}

/// What the fake "proof" serializes to. The fake verifier parses it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakePackedList {
    pub items: Vec<FakePackedItem>,
    pub metadata: Vec<u8>,
}

impl FakePackedList {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Default)]
struct FakeZkState {
    init_calls: AtomicUsize,
    prove_calls: AtomicUsize,
    failing_proves: Mutex<usize>,
    metadata: Mutex<Vec<Vec<u8>>>,
    prove_threads: Mutex<Vec<Option<String>>>,
}

/// Backend whose "proof" is the JSON of what was pushed plus the metadata.
#[derive(Clone, Default)]
pub struct FakeZkBackend {
    state: Arc<FakeZkState>,
    fail_init: bool,
}

impl FakeZkBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Default::default()
        }
    }

    /// Make the next `count` proof generations fail
    pub fn fail_next_proves(&self, count: usize) {
        if let Ok(mut failing) = self.state.failing_proves.lock() {
            *failing = count;
        }
    }

    pub fn init_calls(&self) -> usize {
        self.state.init_calls.load(Ordering::SeqCst)
    }

    pub fn prove_calls(&self) -> usize {
        self.state.prove_calls.load(Ordering::SeqCst)
    }

    /// Metadata of every successful proof, in order
    pub fn metadata(&self) -> Vec<Vec<u8>> {
        self.state
            .metadata
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Name of the thread each successful proof ran on
    pub fn prove_threads(&self) -> Vec<Option<String>> {
        self.state
            .prove_threads
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ZkBackend for FakeZkBackend {
    async fn init(&self) -> Result<()> {
        self.state.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            bail!("fake runtime refused to start");
        }
        Ok(())
    }

    fn builder(&self, fhe_public_key: &[u8]) -> Result<Box<dyn ZkBuilder>> {
        if fhe_public_key.is_empty() {
            bail!("empty public key");
        }
        Ok(Box::new(FakeZkBuilder {
            items: vec![],
            state: self.state.clone(),
        }))
    }

    fn crs(&self, crs: &[u8]) -> Result<Arc<dyn ZkCrs>> {
        if crs.is_empty() {
            bail!("empty crs");
        }
        Ok(Arc::new(FakeCrs))
    }
}

pub struct FakeCrs;

impl ZkCrs for FakeCrs {}

#[derive(Clone)]
pub struct FakeZkBuilder {
    items: Vec<FakePackedItem>,
    state: Arc<FakeZkState>,
}

impl FakeZkBuilder {
    /// Builder not attached to a backend, for packing tests
    pub fn detached() -> Self {
        Self {
            items: vec![],
            state: Arc::default(),
        }
    }

    pub fn items(&self) -> &[FakePackedItem] {
        &self.items
    }
}

impl ZkBuilder for FakeZkBuilder {
    fn push_bool(&mut self, value: bool) -> Result<()> {
        self.items.push(FakePackedItem {
            bits: 1,
            value: U256::from(value as u8),
        });
        Ok(())
    }

    fn push_uint(&mut self, bits: u32, value: U256) -> Result<()> {
        self.items.push(FakePackedItem { bits, value });
        Ok(())
    }

    fn build_with_proof_packed(
        &self,
        _crs: &dyn ZkCrs,
        metadata: &[u8],
        load: ZkComputeLoad,
    ) -> Result<Box<dyn ZkProvenList>> {
        self.state.prove_calls.fetch_add(1, Ordering::SeqCst);
        if load != ZkComputeLoad::Verify {
            bail!("unexpected compute load {load:?}");
        }
        if let Ok(mut failing) = self.state.failing_proves.lock() {
            if *failing > 0 {
                *failing -= 1;
                bail!("fake prover failure");
            }
        }
        if let Ok(mut recorded) = self.state.metadata.lock() {
            recorded.push(metadata.to_vec());
        }
        if let Ok(mut threads) = self.state.prove_threads.lock() {
            threads.push(std::thread::current().name().map(str::to_owned));
        }
        Ok(Box::new(FakePackedList {
            items: self.items.clone(),
            metadata: metadata.to_vec(),
        }))
    }

    fn boxed_clone(&self) -> Box<dyn ZkBuilder> {
        Box::new(self.clone())
    }
}

impl ZkProvenList for FakePackedList {
    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Worker that never manages to prove anything.
pub struct FailingProver;

#[async_trait]
impl Prover for FailingProver {
    async fn prove(
        &self,
        _builder: Box<dyn ZkBuilder>,
        _crs: Arc<dyn ZkCrs>,
        _metadata: Vec<u8>,
    ) -> Result<Vec<u8>, ZkError> {
        Err(ZkError::prove_failed("worker unavailable"))
    }
}
