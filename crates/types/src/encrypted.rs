// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::FheType;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Chain-ready handle to an encrypted input together with the signature authorising it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedItemInput {
    pub ct_hash: U256,
    pub security_zone: u8,
    pub utype: FheType,
    pub signature: String,
}

/// Sealed output returned by the threshold network. Only the permit holder can open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub data: Vec<u8>,
    pub public_key: Vec<u8>,
    pub nonce: Vec<u8>,
}
