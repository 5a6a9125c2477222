// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::FheType;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Caller facing plaintext recovered from a sealed output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnsealedValue {
    Bool(bool),
    Address(Address),
    Uint(U256),
}

impl UnsealedValue {
    /// Convert a raw unsealed integer according to `utype`. Returns `None` for unsupported types.
    pub fn from_raw(utype: FheType, raw: U256) -> Option<Self> {
        if !utype.is_supported() {
            return None;
        }
        Some(match utype {
            FheType::Bool => UnsealedValue::Bool(raw == U256::from(1)),
            FheType::Uint160 => {
                UnsealedValue::Address(Address::from_slice(&raw.to_be_bytes::<32>()[12..]))
            }
            _ => UnsealedValue::Uint(raw),
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            UnsealedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            UnsealedValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            UnsealedValue::Uint(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_by_utype() {
        assert_eq!(
            UnsealedValue::from_raw(FheType::Bool, U256::from(1)),
            Some(UnsealedValue::Bool(true))
        );
        assert_eq!(
            UnsealedValue::from_raw(FheType::Bool, U256::ZERO),
            Some(UnsealedValue::Bool(false))
        );

        let addr = Address::repeat_byte(0xab);
        let raw = U256::from_be_slice(addr.as_slice());
        assert_eq!(
            UnsealedValue::from_raw(FheType::Uint160, raw).and_then(|v| v.as_address()),
            Some(addr)
        );

        assert_eq!(
            UnsealedValue::from_raw(FheType::Uint64, U256::from(77)).and_then(|v| v.as_uint()),
            Some(U256::from(77))
        );
    }

    #[test]
    fn test_unsupported_utype_is_rejected() {
        assert_eq!(UnsealedValue::from_raw(FheType::Uint4, U256::from(1)), None);
        assert_eq!(UnsealedValue::from_raw(FheType::Uint512, U256::from(1)), None);
    }
}
