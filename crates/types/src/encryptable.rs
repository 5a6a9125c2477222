// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::FheType;
use alloy_primitives::{ruint::UintTryFrom, Address, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlainValueError {
    #[error("Could not parse '{0}' as an integer")]
    NotANumber(String),

    #[error("Value {value} does not fit in {utype} ({bits} bits)")]
    Overflow {
        value: U256,
        utype: FheType,
        bits: u32,
    },

    #[error("Boolean value supplied for non boolean utype {0}")]
    BoolForInteger(FheType),
}

/// Plaintext as supplied by the caller. Interpretation is deferred until packing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlainValue {
    Bool(bool),
    Integer(U256),
    Numeric(String),
}

impl PlainValue {
    pub fn to_u256(&self) -> Result<U256, PlainValueError> {
        match self {
            PlainValue::Bool(b) => Ok(U256::from(*b as u8)),
            PlainValue::Integer(v) => Ok(*v),
            PlainValue::Numeric(s) => {
                U256::from_str(s.trim()).map_err(|_| PlainValueError::NotANumber(s.clone()))
            }
        }
    }
}

/// A single plaintext scheduled for encryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptableItem {
    pub utype: FheType,
    pub data: PlainValue,
}

impl EncryptableItem {
    /// Resolve the plaintext and check it fits within the bit-width of `utype`.
    pub fn checked_value(&self) -> Result<U256, PlainValueError> {
        if matches!(self.data, PlainValue::Bool(_)) && self.utype != FheType::Bool {
            return Err(PlainValueError::BoolForInteger(self.utype));
        }
        let value = self.data.to_u256()?;
        let bits = self.utype.bit_width();
        if bits < 256 && value >= (U256::from(1u8) << bits as usize) {
            return Err(PlainValueError::Overflow {
                value,
                utype: self.utype,
                bits,
            });
        }
        Ok(value)
    }
}

/// Constructors for [`EncryptableItem`].
pub struct Encryptable;

impl Encryptable {
    pub fn bool(value: bool) -> EncryptableItem {
        Self::item(FheType::Bool, PlainValue::Bool(value))
    }

    pub fn uint8(value: u8) -> EncryptableItem {
        Self::item(FheType::Uint8, PlainValue::Integer(U256::from(value)))
    }

    pub fn uint16(value: u16) -> EncryptableItem {
        Self::item(FheType::Uint16, PlainValue::Integer(U256::from(value)))
    }

    pub fn uint32(value: u32) -> EncryptableItem {
        Self::item(FheType::Uint32, PlainValue::Integer(U256::from(value)))
    }

    pub fn uint64(value: u64) -> EncryptableItem {
        Self::item(FheType::Uint64, PlainValue::Integer(U256::from(value)))
    }

    pub fn uint128(value: u128) -> EncryptableItem {
        Self::item(FheType::Uint128, PlainValue::Integer(U256::from(value)))
    }

    pub fn uint256(value: U256) -> EncryptableItem {
        Self::item(FheType::Uint256, PlainValue::Integer(value))
    }

    pub fn address(value: Address) -> EncryptableItem {
        Self::item(
            FheType::ADDRESS,
            PlainValue::Integer(U256::from_be_slice(value.as_slice())),
        )
    }

    /// Build an item for an arbitrary utype from any unsigned integer or `U256`. Nothing is
    /// validated until encryption.
    ///
    /// # Panics
    ///
    /// On negative signed integers.
    pub fn create<T>(utype: FheType, value: T) -> EncryptableItem
    where
        U256: UintTryFrom<T>,
    {
        Self::item(utype, PlainValue::Integer(U256::from(value)))
    }

    /// Build an item from a decimal or 0x-prefixed hex string.
    pub fn from_numeric_str(utype: FheType, value: impl Into<String>) -> EncryptableItem {
        Self::item(utype, PlainValue::Numeric(value.into()))
    }

    fn item(utype: FheType, data: PlainValue) -> EncryptableItem {
        EncryptableItem { utype, data }
    }
}

/// Sum of the bit-widths of every item in a batch.
pub fn total_bit_width(items: &[EncryptableItem]) -> u64 {
    sum_bit_widths(items.iter().map(|item| item.utype))
}

fn sum_bit_widths(utypes: impl Iterator<Item = FheType>) -> u64 {
    utypes.map(|utype| u64::from(utype.bit_width())).sum()
}
