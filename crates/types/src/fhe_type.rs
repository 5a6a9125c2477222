// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unknown utype: {0}")]
pub struct UnknownFheType(pub u8);

/// Discriminator for an encrypted value's type. The numeric tags match the ones used on-chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum FheType {
    Bool = 0,
    Uint4 = 1,
    Uint8 = 2,
    Uint16 = 3,
    Uint32 = 4,
    Uint64 = 5,
    Uint128 = 6,
    /// Addresses are encrypted as 160 bit integers
    Uint160 = 7,
    Uint256 = 8,
    Uint512 = 9,
    Uint1024 = 10,
    Uint2048 = 11,
    Uint2 = 12,
    Uint6 = 13,
    Uint10 = 14,
    Uint12 = 15,
    Uint14 = 16,
}

impl FheType {
    pub const ADDRESS: FheType = FheType::Uint160;

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Number of plaintext bits this type occupies inside a proven list.
    pub fn bit_width(self) -> u32 {
        use FheType::*;
        match self {
            Bool => 1,
            Uint2 => 2,
            Uint4 => 4,
            Uint6 => 6,
            Uint8 => 8,
            Uint10 => 10,
            Uint12 => 12,
            Uint14 => 14,
            Uint16 => 16,
            Uint32 => 32,
            Uint64 => 64,
            Uint128 => 128,
            Uint160 => 160,
            Uint256 => 256,
            Uint512 => 512,
            Uint1024 => 1024,
            Uint2048 => 2048,
        }
    }

    /// Types the co-processor accepts as encrypted inputs and can seal back.
    pub fn is_supported(self) -> bool {
        use FheType::*;
        matches!(
            self,
            Bool | Uint8 | Uint16 | Uint32 | Uint64 | Uint128 | Uint160 | Uint256
        )
    }
}

impl From<FheType> for u8 {
    fn from(value: FheType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for FheType {
    type Error = UnknownFheType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use FheType::*;
        Ok(match value {
            0 => Bool,
            1 => Uint4,
            2 => Uint8,
            3 => Uint16,
            4 => Uint32,
            5 => Uint64,
            6 => Uint128,
            7 => Uint160,
            8 => Uint256,
            9 => Uint512,
            10 => Uint1024,
            11 => Uint2048,
            12 => Uint2,
            13 => Uint6,
            14 => Uint10,
            15 => Uint12,
            16 => Uint14,
            other => return Err(UnknownFheType(other)),
        })
    }
}
