// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::{SolCall, SolValue},
};
use anyhow::{Context, Result};

sol! {
    /// Helper deployed on the local test chain. Computes deterministic ciphertext handles and
    /// records the plaintext behind each handle for the mock fhe operations.
    #[derive(Debug)]
    contract MockZkVerifier {
        function zkVerifyCalcCtHashesPacked(
            uint256[] memory values,
            uint8[] memory utypes,
            address user,
            uint8 securityZone,
            uint256 chainId
        ) external view returns (uint256[] memory ctHashes);

        function insertPackedCtHashes(uint256[] memory ctHashes, uint256[] memory values) external;
    }
}

pub fn calc_ct_hashes_calldata(
    values: Vec<U256>,
    utypes: Vec<u8>,
    user: Address,
    security_zone: u8,
    chain_id: u64,
) -> Bytes {
    MockZkVerifier::zkVerifyCalcCtHashesPackedCall {
        values,
        utypes,
        user,
        securityZone: security_zone,
        chainId: U256::from(chain_id),
    }
    .abi_encode()
    .into()
}

pub fn decode_ct_hashes(returned: &[u8]) -> Result<Vec<U256>> {
    Vec::<U256>::abi_decode(returned).context("Could not decode ct hashes")
}

pub fn insert_ct_hashes_calldata(ct_hashes: Vec<U256>, values: Vec<U256>) -> Bytes {
    MockZkVerifier::insertPackedCtHashesCall {
        ctHashes: ct_hashes,
        values,
    }
    .abi_encode()
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_calldata_decodes() -> Result<()> {
        let user = Address::repeat_byte(0x12);
        let data = calc_ct_hashes_calldata(vec![U256::from(5)], vec![6], user, 2, 31337);
        assert_eq!(
            &data[..4],
            MockZkVerifier::zkVerifyCalcCtHashesPackedCall::SELECTOR.as_slice()
        );

        let call = MockZkVerifier::zkVerifyCalcCtHashesPackedCall::abi_decode(&data)?;
        assert_eq!(call.values, vec![U256::from(5)]);
        assert_eq!(call.utypes, vec![6]);
        assert_eq!(call.user, user);
        assert_eq!(call.securityZone, 2);
        assert_eq!(call.chainId, U256::from(31337));
        Ok(())
    }

    #[test]
    fn test_decode_ct_hashes() -> Result<()> {
        let hashes = vec![U256::from(1), U256::MAX];
        assert_eq!(decode_ct_hashes(&hashes.abi_encode())?, hashes);
        assert!(decode_ct_hashes(&[1, 2, 3]).is_err());
        Ok(())
    }
}
