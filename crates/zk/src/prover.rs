// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ZkBuilder, ZkComputeLoad, ZkCrs, ZkError};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rayon::ThreadPool;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{error, warn};

/// Build the proven list for `builder` and serialize it.
pub fn prove_packed(
    builder: &dyn ZkBuilder,
    crs: &dyn ZkCrs,
    metadata: &[u8],
) -> Result<Vec<u8>, ZkError> {
    builder
        .build_with_proof_packed(crs, metadata, ZkComputeLoad::Verify)
        .and_then(|list| list.serialize())
        .map_err(|e| ZkError::prove_failed(format!("{e:#}")))
}

/// Strategy for where proof generation runs.
#[async_trait]
pub trait Prover: Send + Sync {
    async fn prove(
        &self,
        builder: Box<dyn ZkBuilder>,
        crs: Arc<dyn ZkCrs>,
        metadata: Vec<u8>,
    ) -> Result<Vec<u8>, ZkError>;
}

/// Proves on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineProver;

#[async_trait]
impl Prover for InlineProver {
    async fn prove(
        &self,
        builder: Box<dyn ZkBuilder>,
        crs: Arc<dyn ZkCrs>,
        metadata: Vec<u8>,
    ) -> Result<Vec<u8>, ZkError> {
        prove_packed(builder.as_ref(), crs.as_ref(), &metadata)
    }
}

/// Proves on a dedicated rayon pool so the async runtime is not blocked.
#[derive(Clone)]
pub struct ThreadProver {
    pool: Arc<ThreadPool>,
}

impl ThreadProver {
    pub fn new(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("cofhe-prover-{i}"))
            .build()
            .map_err(|e| anyhow!("Failed to build prover thread pool: {e}"))?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// One thread less than the machine has, and never fewer than one
    pub fn default_threads() -> usize {
        thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    }
}

#[async_trait]
impl Prover for ThreadProver {
    async fn prove(
        &self,
        builder: Box<dyn ZkBuilder>,
        crs: Arc<dyn ZkCrs>,
        metadata: Vec<u8>,
    ) -> Result<Vec<u8>, ZkError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.pool.spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| {
                prove_packed(builder.as_ref(), crs.as_ref(), &metadata)
            }))
            .unwrap_or_else(|_| Err(ZkError::prove_failed("prover thread panicked")));
            if tx.send(result).is_err() {
                error!("Proof finished after the caller went away");
            }
        });

        rx.await
            .map_err(|_| ZkError::prove_failed("prover thread exited without a result"))?
    }
}

/// What happened while proving, for progress reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProveOutcome {
    pub proof: Vec<u8>,
    pub used_worker: bool,
    pub worker_failed_error: Option<String>,
}

/// Prove with `worker` when given, retrying inline on a clone of the builder if the worker
/// fails. A worker failure alone is never an error.
pub async fn prove_with_fallback(
    builder: Box<dyn ZkBuilder>,
    crs: Arc<dyn ZkCrs>,
    metadata: Vec<u8>,
    worker: Option<&dyn Prover>,
) -> Result<ProveOutcome, ZkError> {
    let Some(worker) = worker else {
        let proof = InlineProver.prove(builder, crs, metadata).await?;
        return Ok(ProveOutcome {
            proof,
            used_worker: false,
            worker_failed_error: None,
        });
    };

    let fallback = builder.boxed_clone();
    match worker.prove(builder, crs.clone(), metadata.clone()).await {
        Ok(proof) => Ok(ProveOutcome {
            proof,
            used_worker: true,
            worker_failed_error: None,
        }),
        Err(worker_err) => {
            let worker_error = worker_err.to_string();
            warn!(error = %worker_error, "Worker prover failed, retrying inline");
            match InlineProver.prove(fallback, crs, metadata).await {
                Ok(proof) => Ok(ProveOutcome {
                    proof,
                    used_worker: false,
                    worker_failed_error: Some(worker_error),
                }),
                Err(ZkError::ProveFailed { reason, .. }) => Err(ZkError::ProveFailed {
                    reason,
                    worker_error: Some(worker_error),
                }),
                Err(other) => Err(other),
            }
        }
    }
}
