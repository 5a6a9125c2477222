// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Chain id of the local development network where mock contracts replace the co-processor
pub const MOCKS_CHAIN_ID: u64 = 31337;

/// Deterministic address the mock zk verifier is deployed to on the local network
pub const MOCKS_ZK_VERIFIER_ADDRESS: Address =
    address!("0x0000000000000000000000000000000000000100");

/// Well known key whose signatures the mock contracts accept as proof verification
pub const MOCKS_ZK_VERIFIER_SIGNER_PRIVATE_KEY: &str =
    "0x6c8d7f768a6bb4aafe85e8a2f5a9680355239c7e14646ed62b044e39de154512";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MockConfig {
    pub chain_id: u64,
    pub zk_verifier_address: Address,
    pub zk_verifier_signer_key: String,
    /// Artificial delay for the no-op steps so progress reporting looks like the live flow
    pub step_delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            chain_id: MOCKS_CHAIN_ID,
            zk_verifier_address: MOCKS_ZK_VERIFIER_ADDRESS,
            zk_verifier_signer_key: MOCKS_ZK_VERIFIER_SIGNER_PRIVATE_KEY.to_owned(),
            step_delay_ms: 0,
        }
    }
}
