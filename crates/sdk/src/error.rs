// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use cofhe_keys::KeyError;
use cofhe_zk::ZkError;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Machine readable failure reason carried by every [`CofheError`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
pub enum CofheErrorCode {
    InternalError,

    // Connection
    NotConnected,
    PublicWalletGetChainIdFailed,
    PublicWalletGetAddressesFailed,

    // Configuration
    MissingConfig,
    MissingKeyDeserializer,
    MissingZkBackend,
    UnsupportedChain,
    CofheUrlUninitialized,
    ZkVerifierUrlUninitialized,
    ThresholdNetworkUrlUninitialized,
    AccountUninitialized,
    SenderUninitialized,
    ChainIdUninitialized,

    // Key material
    FetchKeysFailed,
    PublicKeyUninitialized,
    CrsUninitialized,
    KeyDeserializationFailed,

    // Encryption
    InitTfheFailed,
    ZkPackFailed,
    ZkProveFailed,
    ZkVerifyFailed,
    EncryptRemainingItems,

    // Mock encryption
    ZkMocksCalcCtHashesFailed,
    ZkMocksInsertCtHashesFailed,
    ZkMocksCreateProofSignatureFailed,

    // Decryption
    PermitNotFound,
    InvalidPermitData,
    PermitStoreFailed,
    SealOutputFailed,
    SealOutputReturnedNull,
    UnsealFailed,
    InvalidUtype,
}

/// Error surfaced through [`crate::CofheResult`]. Never just a bare string: it carries the
/// code, a message, an optional hint, the underlying cause and the inputs that failed.
#[derive(Debug, Clone)]
pub struct CofheError {
    pub code: CofheErrorCode,
    pub message: String,
    pub hint: Option<String>,
    pub cause: Option<Arc<dyn StdError + Send + Sync>>,
    pub context: Option<Value>,
}

impl CofheError {
    pub fn new(code: CofheErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
            cause: None,
            context: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CofheErrorCode::InternalError, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = cause.into().into();
        self.cause = Some(Arc::from(boxed));
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn code(&self) -> CofheErrorCode {
        self.code
    }
}

impl fmt::Display for CofheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl StdError for CofheError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl Serialize for CofheError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CofheError", 5)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("hint", &self.hint)?;
        state.serialize_field("cause", &self.cause.as_ref().map(|c| c.to_string()))?;
        state.serialize_field("context", &self.context)?;
        state.end()
    }
}

impl From<KeyError> for CofheError {
    fn from(value: KeyError) -> Self {
        use CofheErrorCode::*;
        let (code, hint, context) = match &value {
            KeyError::UnsupportedChain(chain_id) => (
                UnsupportedChain,
                Some("Add the chain to `chains` in the cofhe config"),
                json!({ "chain_id": chain_id }),
            ),
            KeyError::CofheUrlUninitialized(chain_id) => (
                CofheUrlUninitialized,
                Some("Set `cofhe_url` for the chain in the cofhe config"),
                json!({ "chain_id": chain_id }),
            ),
            KeyError::FetchFailed { chain_id, what, .. } => (
                FetchKeysFailed,
                None,
                json!({ "chain_id": chain_id, "material": what }),
            ),
            KeyError::NotFheEnabled(chain_id) => (
                FetchKeysFailed,
                Some("The co-processor has not published keys for this chain yet"),
                json!({ "chain_id": chain_id }),
            ),
            KeyError::DeserializationFailed { chain_id, what, .. } => (
                KeyDeserializationFailed,
                None,
                json!({ "chain_id": chain_id, "material": what }),
            ),
            KeyError::Store(_) => (FetchKeysFailed, None, Value::Null),
        };

        let mut error = CofheError::new(code, value.to_string()).with_cause(value);
        if let Some(hint) = hint {
            error = error.with_hint(hint);
        }
        if !context.is_null() {
            error = error.with_context(context);
        }
        error
    }
}

impl From<ZkError> for CofheError {
    fn from(value: ZkError) -> Self {
        use CofheErrorCode::*;
        let code = match &value {
            ZkError::InitFailed(_) => InitTfheFailed,
            ZkError::BitWidthExceeded { .. } | ZkError::PackFailed { .. } => ZkPackFailed,
            ZkError::InvalidKeyMaterial(_) => KeyDeserializationFailed,
            ZkError::ProveFailed { .. } => ZkProveFailed,
            ZkError::VerifyFailed(_) => ZkVerifyFailed,
            ZkError::MocksCalcCtHashesFailed(_) => ZkMocksCalcCtHashesFailed,
            ZkError::MocksInsertCtHashesFailed(_) => ZkMocksInsertCtHashesFailed,
            ZkError::MocksCreateProofSignatureFailed(_) => ZkMocksCreateProofSignatureFailed,
        };
        let context = match &value {
            ZkError::BitWidthExceeded { total, max } => Some(json!({ "total": total, "max": max })),
            ZkError::PackFailed { index, utype, .. } => {
                Some(json!({ "index": index, "utype": utype }))
            }
            ZkError::ProveFailed {
                worker_error: Some(worker_error),
                ..
            } => Some(json!({ "worker_failed_error": worker_error })),
            _ => None,
        };

        let mut error = CofheError::new(code, value.to_string()).with_cause(value);
        error.context = context;
        error
    }
}
