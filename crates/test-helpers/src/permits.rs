// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use anyhow::{bail, Result};
use cofhe_sdk::Permit;
use cofhe_types::EncryptedPayload;
use serde_json::{json, Value};

/// Permit whose "sealing" is the identity: the sealed data is the big endian plaintext.
#[derive(Debug, Clone)]
pub struct FakePermit {
    pub hash: String,
    pub issuer: Address,
    pub chain_id: u64,
    pub expired: bool,
}

impl FakePermit {
    pub fn new(hash: &str, issuer: Address, chain_id: u64) -> Self {
        Self {
            hash: hash.to_owned(),
            issuer,
            chain_id,
            expired: false,
        }
    }

    pub fn expired(mut self) -> Self {
        self.expired = true;
        self
    }
}

impl Permit for FakePermit {
    fn hash(&self) -> String {
        self.hash.clone()
    }

    fn issuer(&self) -> Address {
        self.issuer
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn validate(&self) -> Result<()> {
        if self.expired {
            bail!("permit {} has expired", self.hash);
        }
        Ok(())
    }

    fn permission(&self) -> Value {
        json!({
            "issuer": format!("{:#x}", self.issuer),
            "chain_id": self.chain_id,
            "hash": self.hash,
        })
    }

    fn unseal(&self, sealed: &EncryptedPayload) -> Result<U256> {
        if sealed.data.len() > 32 {
            bail!("sealed data is {} bytes", sealed.data.len());
        }
        Ok(U256::from_be_slice(&sealed.data))
    }
}
