// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use anyhow::{anyhow, bail, Result};

pub const ZK_METADATA_LEN: usize = 1 + 20 + 32;

/// Binds a proof to the account, security zone and chain it was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZkMetadata {
    pub security_zone: u8,
    pub account: Address,
    pub chain_id: u64,
}

impl ZkMetadata {
    pub fn new(account: Address, security_zone: u8, chain_id: u64) -> Self {
        Self {
            security_zone,
            account,
            chain_id,
        }
    }

    /// `security_zone (1) ‖ account (20) ‖ chain_id (32, big endian)`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ZK_METADATA_LEN);
        out.push(self.security_zone);
        out.extend_from_slice(self.account.as_slice());
        out.extend_from_slice(&U256::from(self.chain_id).to_be_bytes::<32>());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ZK_METADATA_LEN {
            bail!(
                "Metadata must be {} bytes, got {}",
                ZK_METADATA_LEN,
                bytes.len()
            );
        }
        let chain_id = U256::from_be_slice(&bytes[21..]);
        Ok(Self {
            security_zone: bytes[0],
            account: Address::from_slice(&bytes[1..21]),
            chain_id: chain_id
                .try_into()
                .map_err(|_| anyhow!("Chain id {chain_id} does not fit in u64"))?,
        })
    }
}
