// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ClientContext;
use crate::{
    result_wrapper, CofheError, CofheErrorCode, CofheResult, ConnectionSnapshot, ConnectionStore,
    DecryptBuilder, EncryptBuilder, InMemoryPermitStore, PendingConnection, PermitStore, Permits,
    Subscription,
};
use alloy::primitives::U256;
use cofhe_config::{CofheConfig, KeyStoreConfig};
use cofhe_data::{InMemStore, KeyValStore, SledStore};
use cofhe_evm_helpers::{PublicClient, WalletClient};
use cofhe_keys::{FetchedKeys, KeyDeserializer, KeyFetcher, KeysStore};
use cofhe_types::{EncryptableItem, FheType};
use cofhe_zk::{Prover, ThreadProver, ZkBackend};
use std::sync::Arc;
use tracing::{info, warn};

/// Collaborators the host platform supplies. Anything left as `None` is either defaulted or
/// reported as a missing dependency when an operation needs it.
#[derive(Default, Clone)]
pub struct PlatformDependencies {
    /// Cryptographic runtime used by the production encrypt path
    pub zk_backend: Option<Arc<dyn ZkBackend>>,
    /// Validates fetched key material
    pub key_deserializer: Option<Arc<dyn KeyDeserializer>>,
    /// Overrides the key cache backing store chosen by `key_store` in the config
    pub key_store: Option<Arc<dyn KeyValStore>>,
    pub permit_store: Option<Arc<dyn PermitStore>>,
    /// Sends the mock ct hash bookkeeping transaction instead of the connected wallet
    pub zkv_signer: Option<Arc<dyn WalletClient>>,
    /// Off-thread prover, defaults to a thread pool when `use_worker` is enabled
    pub worker_prover: Option<Arc<dyn Prover>>,
}

/// Build a client from a validated config and the platform's collaborators.
pub fn create_client(
    config: CofheConfig,
    deps: PlatformDependencies,
) -> Result<CofheClient, CofheError> {
    config.validate().map_err(|e| {
        CofheError::new(
            CofheErrorCode::MissingConfig,
            format!("Invalid cofhe config: {e:#}"),
        )
        .with_cause(e)
    })?;

    let backing = match deps.key_store {
        Some(store) => store,
        None => default_key_store(&config.key_store)?,
    };
    let keys = Arc::new(KeysStore::new(backing).map_err(|e| {
        CofheError::internal(format!("Could not load the key cache: {e:#}")).with_cause(e)
    })?);
    let key_fetcher = deps
        .key_deserializer
        .map(|deserializer| KeyFetcher::new(keys.clone(), deserializer));

    let worker_prover = match deps.worker_prover {
        Some(prover) => Some(prover),
        None if config.use_worker => match ThreadProver::new(ThreadProver::default_threads()) {
            Ok(prover) => Some(Arc::new(prover) as Arc<dyn Prover>),
            Err(e) => {
                warn!("Could not start the prover thread pool, proving inline: {e:#}");
                None
            }
        },
        None => None,
    };

    info!(chains = config.chains.len(), "Created cofhe client");

    Ok(CofheClient {
        ctx: Arc::new(ClientContext {
            config: Arc::new(config),
            connection: ConnectionStore::new(),
            keys,
            key_fetcher,
            zk_backend: deps.zk_backend,
            permit_store: deps
                .permit_store
                .unwrap_or_else(|| Arc::new(InMemoryPermitStore::new())),
            zkv_signer: deps.zkv_signer,
            worker_prover,
            http: reqwest::Client::new(),
        }),
    })
}

fn default_key_store(config: &KeyStoreConfig) -> Result<Arc<dyn KeyValStore>, CofheError> {
    Ok(match config {
        KeyStoreConfig::Memory => Arc::new(InMemStore::new(false)),
        KeyStoreConfig::Sled { path } => Arc::new(SledStore::new(path, "keys").map_err(|e| {
            CofheError::new(
                CofheErrorCode::MissingConfig,
                format!("Could not open key store at {}: {e:#}", path.display()),
            )
            .with_cause(e)
        })?),
    })
}

/// Entry point for every sdk operation. Cheap to clone, clones share one connection and
/// one key cache.
#[derive(Clone)]
pub struct CofheClient {
    ctx: Arc<ClientContext>,
}

impl CofheClient {
    pub fn connect(
        &self,
        public: Arc<dyn PublicClient>,
        wallet: Arc<dyn WalletClient>,
    ) -> PendingConnection {
        self.ctx.connection.connect(public, wallet)
    }

    pub fn disconnect(&self) {
        self.ctx.connection.disconnect();
    }

    pub fn encrypt_inputs(&self, items: Vec<EncryptableItem>) -> EncryptBuilder {
        EncryptBuilder::new(self.ctx.clone(), items)
    }

    pub fn decrypt_handle(&self, ct_hash: U256, utype: FheType) -> DecryptBuilder {
        DecryptBuilder::new(self.ctx.clone(), ct_hash, utype)
    }

    pub fn permits(&self) -> Permits {
        Permits::new(self.ctx.clone())
    }

    pub fn get_snapshot(&self) -> ConnectionSnapshot {
        self.ctx.connection.snapshot()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&ConnectionSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        self.ctx.connection.subscribe(listener)
    }

    pub fn config(&self) -> &CofheConfig {
        &self.ctx.config
    }

    pub fn keys(&self) -> &Arc<KeysStore> {
        &self.ctx.keys
    }

    /// Warm the key cache for one chain and security zone.
    pub async fn fetch_keys(&self, chain_id: u64, security_zone: u8) -> CofheResult<FetchedKeys> {
        result_wrapper(async {
            let fetcher = self.key_fetcher()?;
            Ok(fetcher
                .fetch_keys(&self.ctx.config, chain_id, security_zone)
                .await?)
        })
        .await
    }

    /// Warm the key cache for every configured chain except the mock chain.
    pub async fn fetch_multichain_keys(&self) -> CofheResult<Vec<FetchedKeys>> {
        result_wrapper(async {
            let fetcher = self.key_fetcher()?;
            Ok(fetcher.fetch_multichain_keys(&self.ctx.config).await?)
        })
        .await
    }

    fn key_fetcher(&self) -> Result<&KeyFetcher, CofheError> {
        self.ctx.key_fetcher.as_ref().ok_or_else(|| {
            CofheError::new(
                CofheErrorCode::MissingKeyDeserializer,
                "No key deserializer provided",
            )
            .with_hint("Pass a key_deserializer in the platform dependencies")
        })
    }
}
