// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use cofhe_types::FheType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZkError {
    #[error("Failed to initialise the fhe runtime: {0}")]
    InitFailed(String),

    #[error("Total bit width {total} exceeds the maximum of {max} bits")]
    BitWidthExceeded { total: u64, max: u32 },

    #[error("Failed to pack item {index} ({utype}): {reason}")]
    PackFailed {
        index: usize,
        utype: FheType,
        reason: String,
    },

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Proof generation failed: {reason}")]
    ProveFailed {
        reason: String,
        /// Set when the worker failed first and the inline retry failed too
        worker_error: Option<String>,
    },

    #[error("Proof verification failed: {0}")]
    VerifyFailed(String),

    #[error("Mock ct hash calculation failed: {0}")]
    MocksCalcCtHashesFailed(String),

    #[error("Mock ct hash insertion failed: {0}")]
    MocksInsertCtHashesFailed(String),

    #[error("Mock proof signature failed: {0}")]
    MocksCreateProofSignatureFailed(String),
}

impl ZkError {
    pub fn prove_failed(reason: impl ToString) -> Self {
        ZkError::ProveFailed {
            reason: reason.to_string(),
            worker_error: None,
        }
    }
}
