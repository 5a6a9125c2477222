// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;

/// Parses key material with the fhe library purely to prove it is well formed. The parsed
/// objects are discarded.
pub trait KeyDeserializer: Send + Sync {
    fn deserialize_fhe_public_key(&self, bytes: &[u8]) -> Result<()>;
    fn deserialize_crs(&self, bytes: &[u8]) -> Result<()>;
}
