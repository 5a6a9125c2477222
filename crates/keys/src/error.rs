// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Chain {0} is not configured")]
    UnsupportedChain(u64),

    #[error("No cofhe url configured for chain {0}")]
    CofheUrlUninitialized(u64),

    #[error("Failed to fetch {what} for chain {chain_id}: {reason}")]
    FetchFailed {
        what: &'static str,
        chain_id: u64,
        reason: String,
    },

    #[error("Chain {0} has not been fhe enabled")]
    NotFheEnabled(u64),

    #[error("Fetched {what} for chain {chain_id} failed validation: {reason}")]
    DeserializationFailed {
        what: &'static str,
        chain_id: u64,
        reason: String,
    },

    #[error("Key store error: {0}")]
    Store(#[from] anyhow::Error),
}
