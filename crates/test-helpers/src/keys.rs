// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{bail, Result};
use cofhe_keys::{KeyDeserializer, MIN_PUBLIC_KEY_HEX_LEN};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hex public key just long enough to pass the length check
pub fn fake_public_key_hex() -> String {
    format!("0x{}", "ab".repeat(MIN_PUBLIC_KEY_HEX_LEN / 2))
}

pub fn fake_crs_hex() -> String {
    format!("0x{}", "cd".repeat(64))
}

/// Accepts (or rejects) whatever it is given and counts the calls.
#[derive(Default)]
pub struct FakeKeyDeserializer {
    reject_public_key: bool,
    reject_crs: bool,
    calls: AtomicUsize,
}

impl FakeKeyDeserializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_public_key() -> Self {
        Self {
            reject_public_key: true,
            ..Default::default()
        }
    }

    pub fn rejecting_crs() -> Self {
        Self {
            reject_crs: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeyDeserializer for FakeKeyDeserializer {
    fn deserialize_fhe_public_key(&self, bytes: &[u8]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_public_key || bytes.is_empty() {
            bail!("malformed public key");
        }
        Ok(())
    }

    fn deserialize_crs(&self, bytes: &[u8]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_crs || bytes.is_empty() {
            bail!("malformed crs");
        }
        Ok(())
    }
}
