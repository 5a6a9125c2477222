// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::U256;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// How much work the prover does up front. Packed input lists are always built with
/// [`ZkComputeLoad::Verify`] so the verifier does the cheaper side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZkComputeLoad {
    Proof,
    Verify,
}

/// Parsed common reference string.
pub trait ZkCrs: Send + Sync {}

/// A list of ciphertexts together with the proof that they were encrypted correctly.
pub trait ZkProvenList: Send {
    fn serialize(&self) -> Result<Vec<u8>>;
}

/// Accumulates plaintexts to encrypt under the network public key.
pub trait ZkBuilder: Send {
    fn push_bool(&mut self, value: bool) -> Result<()>;

    fn push_uint(&mut self, bits: u32, value: U256) -> Result<()>;

    fn build_with_proof_packed(
        &self,
        crs: &dyn ZkCrs,
        metadata: &[u8],
        load: ZkComputeLoad,
    ) -> Result<Box<dyn ZkProvenList>>;

    fn boxed_clone(&self) -> Box<dyn ZkBuilder>;
}

/// Entry point to the fhe library.
#[async_trait]
pub trait ZkBackend: Send + Sync {
    /// Initialise the fhe runtime. Safe to call repeatedly.
    async fn init(&self) -> Result<()>;

    /// New empty builder encrypting under `fhe_public_key`
    fn builder(&self, fhe_public_key: &[u8]) -> Result<Box<dyn ZkBuilder>>;

    fn crs(&self, crs: &[u8]) -> Result<Arc<dyn ZkCrs>>;
}
