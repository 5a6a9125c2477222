// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ZkBuilder, ZkError};
use alloy::primitives::U256;
use cofhe_types::{total_bit_width, EncryptableItem, FheType, MAX_ENCRYPTABLE_BITS};

/// Reject batches whose combined bit-width cannot fit in a single proven list.
pub fn check_bit_width(items: &[EncryptableItem]) -> Result<(), ZkError> {
    let total = total_bit_width(items);
    if total > u64::from(MAX_ENCRYPTABLE_BITS) {
        return Err(ZkError::BitWidthExceeded {
            total,
            max: MAX_ENCRYPTABLE_BITS,
        });
    }
    Ok(())
}

/// Resolve every item's plaintext and check it against its utype, preserving input order.
pub fn plaintext_values(items: &[EncryptableItem]) -> Result<Vec<U256>, ZkError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.utype.is_supported() {
                return Err(ZkError::PackFailed {
                    index,
                    utype: item.utype,
                    reason: "unsupported utype".to_string(),
                });
            }
            item.checked_value().map_err(|e| ZkError::PackFailed {
                index,
                utype: item.utype,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Push every item onto `builder` in order.
pub fn pack(
    items: &[EncryptableItem],
    mut builder: Box<dyn ZkBuilder>,
) -> Result<Box<dyn ZkBuilder>, ZkError> {
    check_bit_width(items)?;
    let values = plaintext_values(items)?;

    for (index, (item, value)) in items.iter().zip(values).enumerate() {
        use FheType::*;
        let pushed = match item.utype {
            Bool => builder.push_bool(value == U256::from(1)),
            Uint8 | Uint16 | Uint32 | Uint64 | Uint128 | Uint160 | Uint256 => {
                builder.push_uint(item.utype.bit_width(), value)
            }
            Uint2 | Uint4 | Uint6 | Uint10 | Uint12 | Uint14 | Uint512 | Uint1024 | Uint2048 => {
                Err(anyhow::anyhow!("unsupported utype"))
            }
        };
        pushed.map_err(|e| ZkError::PackFailed {
            index,
            utype: item.utype,
            reason: format!("{e:#}"),
        })?;
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ZkComputeLoad, ZkCrs, ZkProvenList};
    use anyhow::Result;
    use cofhe_types::{Encryptable, PlainValue};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingBuilder {
        pushed: Arc<Mutex<Vec<(u32, U256)>>>,
    }

    impl ZkBuilder for RecordingBuilder {
        fn push_bool(&mut self, value: bool) -> Result<()> {
            self.pushed.lock().unwrap().push((1, U256::from(value as u8)));
            Ok(())
        }

        fn push_uint(&mut self, bits: u32, value: U256) -> Result<()> {
            self.pushed.lock().unwrap().push((bits, value));
            Ok(())
        }

        fn build_with_proof_packed(
            &self,
            _crs: &dyn ZkCrs,
            _metadata: &[u8],
            _load: ZkComputeLoad,
        ) -> Result<Box<dyn ZkProvenList>> {
            anyhow::bail!("not used")
        }

        fn boxed_clone(&self) -> Box<dyn ZkBuilder> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_pack_dispatches_by_utype() {
        let builder = RecordingBuilder::default();
        let pushed = builder.pushed.clone();
        let items = vec![
            Encryptable::bool(true),
            Encryptable::uint128(100),
            Encryptable::from_numeric_str(FheType::Uint32, "0x20"),
        ];
        assert!(pack(&items, Box::new(builder)).is_ok());
        assert_eq!(
            *pushed.lock().unwrap(),
            vec![
                (1, U256::from(1)),
                (128, U256::from(100)),
                (32, U256::from(32))
            ]
        );
    }

    #[test]
    fn test_pack_rejects_values_that_do_not_fit() {
        let items = vec![EncryptableItem {
            utype: FheType::Uint8,
            data: PlainValue::Integer(U256::from(256)),
        }];
        assert!(matches!(
            pack(&items, Box::new(RecordingBuilder::default())),
            Err(ZkError::PackFailed { index: 0, .. })
        ));
    }

    #[test]
    fn test_bit_width_boundary() {
        let exact: Vec<_> = (0..8).map(|_| Encryptable::uint256(U256::ZERO)).collect();
        assert!(check_bit_width(&exact).is_ok());

        let mut over = exact.clone();
        over.push(Encryptable::bool(true));
        assert_eq!(
            check_bit_width(&over),
            Err(ZkError::BitWidthExceeded {
                total: 2049,
                max: 2048
            })
        );
    }

    #[test]
    fn test_plaintext_values_in_order() {
        let items = vec![
            Encryptable::uint8(7),
            Encryptable::bool(true),
            Encryptable::uint8(7),
        ];
        assert_eq!(
            plaintext_values(&items).unwrap(),
            vec![U256::from(7), U256::from(1), U256::from(7)]
        );
    }

    #[test]
    fn test_unsupported_utype_fails() {
        let items = vec![
            Encryptable::uint8(1),
            Encryptable::create(FheType::Uint4, 1u8),
        ];
        assert!(matches!(
            plaintext_values(&items),
            Err(ZkError::PackFailed {
                index: 1,
                utype: FheType::Uint4,
                ..
            })
        ));
    }
}
