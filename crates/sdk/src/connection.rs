// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{result_wrapper, CofheError, CofheErrorCode, CofheResult};
use alloy::primitives::Address;
use cofhe_evm_helpers::{PublicClient, WalletClient};
use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{debug, info, warn};

/// A connection attempt. Cloning yields the same in-flight attempt.
pub type PendingConnection = Shared<BoxFuture<'static, CofheResult<bool>>>;

type Listener = Arc<dyn Fn(&ConnectionSnapshot) + Send + Sync>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionSnapshot {
    pub connected: bool,
    pub connecting: bool,
    pub connect_error: Option<CofheError>,
    pub chain_id: Option<u64>,
    pub account: Option<Address>,
}

#[derive(Default)]
struct ConnectionInner {
    snapshot: ConnectionSnapshot,
    public_client: Option<Arc<dyn PublicClient>>,
    wallet_client: Option<Arc<dyn WalletClient>>,
    pending: Option<PendingConnection>,
    attempt: u64,
}

impl ConnectionInner {
    fn has_clients(&self, public: &Arc<dyn PublicClient>, wallet: &Arc<dyn WalletClient>) -> bool {
        let same_public = self
            .public_client
            .as_ref()
            .is_some_and(|current| same_instance(current, public));
        let same_wallet = self
            .wallet_client
            .as_ref()
            .is_some_and(|current| same_instance(current, wallet));
        same_public && same_wallet
    }
}

fn same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Tracks the bound chain and account clients and notifies subscribers on every transition.
#[derive(Default)]
pub struct ConnectionStore {
    inner: Mutex<ConnectionInner>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
}

impl ConnectionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bind to `public` and `wallet`.
    ///
    /// Already connected with the same clients resolves immediately. Already connecting with
    /// the same clients hands back the attempt in flight. Anything else starts a new attempt
    /// which supersedes the previous one. New attempts are driven on the current tokio runtime,
    /// so they complete whether or not the returned handle is awaited.
    pub fn connect(
        self: &Arc<Self>,
        public: Arc<dyn PublicClient>,
        wallet: Arc<dyn WalletClient>,
    ) -> PendingConnection {
        let (pending, snapshot) = {
            let Ok(mut inner) = self.lock() else {
                return future::ready(poisoned()).boxed().shared();
            };

            if inner.has_clients(&public, &wallet) {
                if inner.snapshot.connected {
                    return future::ready(CofheResult::ok(true)).boxed().shared();
                }
                if let (true, Some(pending)) = (inner.snapshot.connecting, &inner.pending) {
                    debug!("Joining connection attempt in flight");
                    return pending.clone();
                }
            }

            inner.attempt += 1;
            let attempt = inner.attempt;
            inner.public_client = Some(public.clone());
            inner.wallet_client = Some(wallet.clone());
            inner.snapshot = ConnectionSnapshot {
                connecting: true,
                ..Default::default()
            };

            let store = Arc::downgrade(self);
            let pending = async move {
                let outcome = result_wrapper(resolve(public, wallet)).await;
                finish(store, attempt, outcome)
            }
            .boxed()
            .shared();
            inner.pending = Some(pending.clone());
            (pending, inner.snapshot.clone())
        };

        self.notify(&snapshot);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(pending.clone());
            }
            Err(_) => debug!("No tokio runtime, connection attempt runs when awaited"),
        }
        pending
    }

    /// Forget the bound clients. An attempt in flight is abandoned.
    pub fn disconnect(&self) {
        let snapshot = {
            let Ok(mut inner) = self.lock() else {
                return;
            };
            let attempt = inner.attempt + 1;
            *inner = ConnectionInner {
                attempt,
                ..Default::default()
            };
            inner.snapshot.clone()
        };
        info!("Disconnected");
        self.notify(&snapshot);
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.lock()
            .map(|inner| inner.snapshot.clone())
            .unwrap_or_default()
    }

    /// The attempt in flight, if any.
    pub fn pending(&self) -> Option<PendingConnection> {
        self.lock().ok().and_then(|inner| {
            inner
                .snapshot
                .connecting
                .then(|| inner.pending.clone())
                .flatten()
        })
    }

    pub fn public_client(&self) -> Option<Arc<dyn PublicClient>> {
        self.lock().ok().and_then(|inner| {
            inner
                .snapshot
                .connected
                .then(|| inner.public_client.clone())
                .flatten()
        })
    }

    pub fn wallet_client(&self) -> Option<Arc<dyn WalletClient>> {
        self.lock().ok().and_then(|inner| {
            inner
                .snapshot
                .connected
                .then(|| inner.wallet_client.clone())
                .flatten()
        })
    }

    /// Register `listener` for every subsequent snapshot.
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(&ConnectionSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        Subscription {
            id,
            store: Arc::downgrade(self),
        }
    }

    fn unsubscribe(&self, id: u64) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }

    fn notify(&self, snapshot: &ConnectionSnapshot) {
        let listeners: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| l.clone()).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(snapshot);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ConnectionInner>, CofheError> {
        self.inner
            .lock()
            .map_err(|_| CofheError::internal("Connection state lock poisoned"))
    }
}

/// Handle returned by [`ConnectionStore::subscribe`].
pub struct Subscription {
    id: u64,
    store: Weak<ConnectionStore>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}

fn poisoned() -> CofheResult<bool> {
    CofheResult::err(CofheError::internal("Connection state lock poisoned"))
}

async fn resolve(
    public: Arc<dyn PublicClient>,
    wallet: Arc<dyn WalletClient>,
) -> Result<(u64, Address), CofheError> {
    let chain_id = public
        .get_chain_id()
        .await
        .map_err(|e| {
            CofheError::new(
                CofheErrorCode::PublicWalletGetChainIdFailed,
                "Failed to get chain id from the public client",
            )
            .with_cause(e)
        })?
        .ok_or_else(|| {
            CofheError::new(
                CofheErrorCode::PublicWalletGetChainIdFailed,
                "Public client returned no chain id",
            )
        })?;

    let account = wallet
        .get_addresses()
        .await
        .map_err(|e| {
            CofheError::new(
                CofheErrorCode::PublicWalletGetAddressesFailed,
                "Failed to get addresses from the wallet client",
            )
            .with_cause(e)
        })?
        .first()
        .copied()
        .ok_or_else(|| {
            CofheError::new(
                CofheErrorCode::PublicWalletGetAddressesFailed,
                "Wallet client returned no addresses",
            )
            .with_hint("Unlock or select an account in the wallet")
        })?;

    Ok((chain_id, account))
}

fn finish(
    store: Weak<ConnectionStore>,
    attempt: u64,
    outcome: CofheResult<(u64, Address)>,
) -> CofheResult<bool> {
    let outcome = outcome.into_result();
    let Some(store) = store.upgrade() else {
        return outcome.map(|_| true).into();
    };

    let snapshot = {
        let Ok(mut inner) = store.lock() else {
            return poisoned();
        };
        if inner.attempt != attempt {
            debug!(attempt, "Discarding superseded connection attempt");
            return outcome.map(|_| true).into();
        }

        inner.pending = None;
        inner.snapshot = match &outcome {
            Ok((chain_id, account)) => {
                info!(chain_id, %account, "Connected");
                ConnectionSnapshot {
                    connected: true,
                    chain_id: Some(*chain_id),
                    account: Some(*account),
                    ..Default::default()
                }
            }
            Err(error) => {
                warn!(code = %error.code, "Connection failed: {}", error.message);
                inner.public_client = None;
                inner.wallet_client = None;
                ConnectionSnapshot {
                    connect_error: Some(error.clone()),
                    ..Default::default()
                }
            }
        };
        inner.snapshot.clone()
    };

    store.notify(&snapshot);
    outcome.map(|_| true).into()
}
