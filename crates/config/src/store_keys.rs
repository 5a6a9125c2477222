// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub struct StoreKeys;

impl StoreKeys {
    /// Namespace under which the fhe public key / crs cache is persisted
    pub fn keys() -> String {
        String::from("cofhe-keys")
    }
}
