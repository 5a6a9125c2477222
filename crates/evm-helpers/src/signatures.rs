// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Signatures standing in for zk proof verification on the local test chain.
//!
//! The mock verifier contract recovers the signer of
//! `eth_sign(keccak256(abi.encodePacked(uint256 ctHash, int32 securityZone, uint8 utype)))`
//! and accepts the input when it matches the well known verifier signer.

use alloy::{
    primitives::{keccak256, Address, Signature, B256, U256},
    signers::{local::PrivateKeySigner, SignerSync},
};
use anyhow::{anyhow, Result};
use cofhe_types::FheType;

pub const PROOF_PAYLOAD_LEN: usize = 32 + 4 + 1;

/// `abi.encodePacked(uint256 ctHash, int32 securityZone, uint8 utype)`
pub fn packed_proof_payload(ct_hash: U256, security_zone: u8, utype: FheType) -> Vec<u8> {
    let mut payload = Vec::with_capacity(PROOF_PAYLOAD_LEN);
    payload.extend_from_slice(&ct_hash.to_be_bytes::<32>());
    payload.extend_from_slice(&i32::from(security_zone).to_be_bytes());
    payload.push(utype.as_u8());
    payload
}

pub fn proof_digest(ct_hash: U256, security_zone: u8, utype: FheType) -> B256 {
    keccak256(packed_proof_payload(ct_hash, security_zone, utype))
}

/// Returns the signature as 0x-prefixed hex of the 65 byte `r ‖ s ‖ v` encoding.
pub fn sign_mock_proof(
    signer: &PrivateKeySigner,
    ct_hash: U256,
    security_zone: u8,
    utype: FheType,
) -> Result<String> {
    let digest = proof_digest(ct_hash, security_zone, utype);
    let sig = signer
        .sign_message_sync(digest.as_slice())
        .map_err(|e| anyhow!("Failed to sign mock proof: {e}"))?;
    Ok(format!("0x{}", hex::encode(sig.as_bytes())))
}

pub fn recover_mock_proof_signer(
    signature: &str,
    ct_hash: U256,
    security_zone: u8,
    utype: FheType,
) -> Result<Address> {
    let bytes = hex::decode(signature.trim_start_matches("0x"))?;
    let sig = Signature::try_from(bytes.as_slice()).map_err(|e| anyhow!("Invalid signature: {e}"))?;
    sig.recover_address_from_msg(proof_digest(ct_hash, security_zone, utype).as_slice())
        .map_err(|e| anyhow!("Failed to recover signer address: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x6c8d7f768a6bb4aafe85e8a2f5a9680355239c7e14646ed62b044e39de154512";

    #[test]
    fn test_packed_payload_layout() {
        let encoded = packed_proof_payload(U256::from(1), 3, FheType::Uint128);
        assert_eq!(encoded.len(), PROOF_PAYLOAD_LEN);
        assert_eq!(&encoded[..31], &[0u8; 31]);
        assert_eq!(encoded[31], 1);
        assert_eq!(&encoded[32..], &[0, 0, 0, 3, 6]);
        assert_eq!(
            proof_digest(U256::from(1), 3, FheType::Uint128),
            keccak256(&encoded)
        );
    }

    #[test]
    fn test_sign_and_recover() -> Result<()> {
        let signer: PrivateKeySigner = KEY.parse()?;
        let sig = sign_mock_proof(&signer, U256::from(42), 0, FheType::Uint32)?;
        assert!(sig.starts_with("0x"));
        assert_eq!(sig.len(), 2 + 65 * 2);

        let recovered = recover_mock_proof_signer(&sig, U256::from(42), 0, FheType::Uint32)?;
        assert_eq!(recovered, signer.address());

        let other = recover_mock_proof_signer(&sig, U256::from(42), 1, FheType::Uint32)?;
        assert_ne!(other, signer.address());
        Ok(())
    }
}
