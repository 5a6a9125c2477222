// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CofheError, CofheErrorCode};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error};

/// Outcome of every public operation: exactly one of `data` or `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct CofheResult<T> {
    success: bool,
    data: Option<T>,
    error: Option<CofheError>,
}

impl<T> CofheResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: CofheError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&CofheError> {
        self.error.as_ref()
    }

    pub fn into_result(self) -> Result<T, CofheError> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(error)) => Err(error),
            (None, None) => Err(CofheError::internal("Result carries neither data nor error")),
        }
    }
}

impl<T> From<Result<T, CofheError>> for CofheResult<T> {
    fn from(value: Result<T, CofheError>) -> Self {
        match value {
            Ok(data) => CofheResult::ok(data),
            Err(error) => CofheResult::err(error),
        }
    }
}

/// Run `fut` and fold every way it can fail, panics included, into a [`CofheResult`].
pub async fn result_wrapper<T, F>(fut: F) -> CofheResult<T>
where
    F: Future<Output = Result<T, CofheError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(data)) => CofheResult::ok(data),
        Ok(Err(err)) => {
            debug!(code = %err.code, "{}", err.message);
            CofheResult::err(err)
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!("Unexpected panic: {}", message);
            CofheResult::err(CofheError::new(
                CofheErrorCode::InternalError,
                format!("An unexpected error occurred: {message}"),
            ))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_failed<T>(result: &CofheResult<T>, code: CofheErrorCode) {
        assert!(!result.success());
        assert!(result.data().is_none());
        assert_eq!(result.error().map(|e| e.code), Some(code));
    }

    #[tokio::test]
    async fn test_wraps_success() {
        let result = result_wrapper(async { Ok::<_, CofheError>(7) }).await;
        assert!(result.success());
        assert_eq!(result.data(), Some(&7));
        assert!(result.error().is_none());
        assert_eq!(result.into_result().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_wraps_error() {
        let result = result_wrapper(async {
            Err::<u8, _>(CofheError::new(CofheErrorCode::NotConnected, "no client"))
        })
        .await;
        assert_failed(&result, CofheErrorCode::NotConnected);
    }

    #[tokio::test]
    async fn test_wraps_panic_as_internal_error() {
        let result = result_wrapper(async {
            if true {
                panic!("exploded");
            }
            Ok::<u8, CofheError>(1)
        })
        .await;
        assert_failed(&result, CofheErrorCode::InternalError);
        assert!(result.error().unwrap().message.contains("exploded"));
    }

    #[test]
    fn test_serialized_shape() {
        let ok = serde_json::to_value(CofheResult::ok(vec![1u8])).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({ "success": true, "data": [1], "error": null })
        );

        let err = serde_json::to_value(CofheResult::<u8>::err(CofheError::new(
            CofheErrorCode::InvalidUtype,
            "bad",
        )))
        .unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["data"], serde_json::Value::Null);
        assert_eq!(err["error"]["code"], "InvalidUtype");
    }
}
