// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;

/// Injectable persistence backend. Implementors manage their own interior mutability so a single
/// store can be shared behind an `Arc` by every cache in the process.
pub trait KeyValStore: Send + Sync {
    fn insert(&self, key: &str, value: Vec<u8>) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn remove(&self, key: &str) -> Result<()>;
}
