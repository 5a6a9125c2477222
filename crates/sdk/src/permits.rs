// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ClientContext;
use crate::{result_wrapper, CofheError, CofheErrorCode, CofheResult};
use alloy::primitives::{Address, U256};
use anyhow::{anyhow, bail, Result};
use cofhe_types::EncryptedPayload;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

/// A signed capability authorising its holder to unseal values for one account on one chain.
/// Creation and signing happen elsewhere; the sdk only consumes permits.
pub trait Permit: Send + Sync + Debug {
    /// Stable identifier used for lookups
    fn hash(&self) -> String;

    fn issuer(&self) -> Address;

    /// Chain of the permit's signed domain
    fn chain_id(&self) -> u64;

    /// Fails when the permit is expired or malformed
    fn validate(&self) -> Result<()>;

    /// Representation sent to the threshold network
    fn permission(&self) -> Value;

    /// Open a sealed output with the permit's sealing key
    fn unseal(&self, sealed: &EncryptedPayload) -> Result<U256>;
}

/// Injectable storage of permits keyed by `(chain_id, account)`. Implementors manage their own
/// interior mutability.
pub trait PermitStore: Send + Sync {
    fn get_permit(
        &self,
        chain_id: u64,
        account: Address,
        hash: &str,
    ) -> Result<Option<Arc<dyn Permit>>>;

    fn get_active_permit(&self, chain_id: u64, account: Address)
        -> Result<Option<Arc<dyn Permit>>>;

    fn get_permits(&self, chain_id: u64, account: Address) -> Result<Vec<Arc<dyn Permit>>>;

    fn set_permit(&self, chain_id: u64, account: Address, permit: Arc<dyn Permit>) -> Result<()>;

    fn set_active_permit_hash(&self, chain_id: u64, account: Address, hash: &str) -> Result<()>;

    fn remove_permit(&self, chain_id: u64, account: Address, hash: &str) -> Result<()>;
}

#[derive(Default)]
struct AccountPermits {
    permits: BTreeMap<String, Arc<dyn Permit>>,
    active: Option<String>,
}

#[derive(Default)]
pub struct InMemoryPermitStore {
    data: RwLock<HashMap<(u64, Address), AccountPermits>>,
}

impl InMemoryPermitStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(
        &self,
        chain_id: u64,
        account: Address,
        f: impl FnOnce(Option<&AccountPermits>) -> T,
    ) -> Result<T> {
        let data = self
            .data
            .read()
            .map_err(|_| anyhow!("Permit store lock poisoned"))?;
        Ok(f(data.get(&(chain_id, account))))
    }

    fn write<T>(
        &self,
        chain_id: u64,
        account: Address,
        f: impl FnOnce(&mut AccountPermits) -> Result<T>,
    ) -> Result<T> {
        let mut data = self
            .data
            .write()
            .map_err(|_| anyhow!("Permit store lock poisoned"))?;
        f(data.entry((chain_id, account)).or_default())
    }
}

impl PermitStore for InMemoryPermitStore {
    fn get_permit(
        &self,
        chain_id: u64,
        account: Address,
        hash: &str,
    ) -> Result<Option<Arc<dyn Permit>>> {
        self.read(chain_id, account, |entry| {
            entry.and_then(|e| e.permits.get(hash).cloned())
        })
    }

    fn get_active_permit(
        &self,
        chain_id: u64,
        account: Address,
    ) -> Result<Option<Arc<dyn Permit>>> {
        self.read(chain_id, account, |entry| {
            entry.and_then(|e| {
                e.active
                    .as_ref()
                    .and_then(|hash| e.permits.get(hash).cloned())
            })
        })
    }

    fn get_permits(&self, chain_id: u64, account: Address) -> Result<Vec<Arc<dyn Permit>>> {
        self.read(chain_id, account, |entry| {
            entry
                .map(|e| e.permits.values().cloned().collect())
                .unwrap_or_default()
        })
    }

    fn set_permit(&self, chain_id: u64, account: Address, permit: Arc<dyn Permit>) -> Result<()> {
        self.write(chain_id, account, |entry| {
            entry.permits.insert(permit.hash(), permit);
            Ok(())
        })
    }

    fn set_active_permit_hash(&self, chain_id: u64, account: Address, hash: &str) -> Result<()> {
        self.write(chain_id, account, |entry| {
            if !entry.permits.contains_key(hash) {
                bail!("No permit {hash} stored for {account} on chain {chain_id}");
            }
            entry.active = Some(hash.to_owned());
            Ok(())
        })
    }

    fn remove_permit(&self, chain_id: u64, account: Address, hash: &str) -> Result<()> {
        self.write(chain_id, account, |entry| {
            entry.permits.remove(hash);
            if entry.active.as_deref() == Some(hash) {
                entry.active = None;
            }
            Ok(())
        })
    }
}

/// Permit operations scoped to the connected chain and account unless overridden.
pub struct Permits {
    ctx: Arc<ClientContext>,
    chain_id: Option<u64>,
    account: Option<Address>,
}

impl Permits {
    pub(crate) fn new(ctx: Arc<ClientContext>) -> Self {
        Self {
            ctx,
            chain_id: None,
            account: None,
        }
    }

    pub fn on_chain(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn for_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub async fn get_permit(&self, hash: &str) -> CofheResult<Option<Arc<dyn Permit>>> {
        result_wrapper(async {
            let (chain_id, account) = self.scope().await?;
            self.ctx
                .permit_store
                .get_permit(chain_id, account, hash)
                .map_err(store_failed)
        })
        .await
    }

    pub async fn get_active_permit(&self) -> CofheResult<Option<Arc<dyn Permit>>> {
        result_wrapper(async {
            let (chain_id, account) = self.scope().await?;
            self.ctx
                .permit_store
                .get_active_permit(chain_id, account)
                .map_err(store_failed)
        })
        .await
    }

    pub async fn get_permits(&self) -> CofheResult<Vec<Arc<dyn Permit>>> {
        result_wrapper(async {
            let (chain_id, account) = self.scope().await?;
            self.ctx
                .permit_store
                .get_permits(chain_id, account)
                .map_err(store_failed)
        })
        .await
    }

    /// Store `permit` after checking it is still valid.
    pub async fn store_permit(&self, permit: Arc<dyn Permit>) -> CofheResult<String> {
        result_wrapper(async {
            let (chain_id, account) = self.scope().await?;
            permit.validate().map_err(invalid_permit)?;
            let hash = permit.hash();
            self.ctx
                .permit_store
                .set_permit(chain_id, account, permit)
                .map_err(store_failed)?;
            Ok(hash)
        })
        .await
    }

    pub async fn set_active_permit(&self, hash: &str) -> CofheResult<()> {
        result_wrapper(async {
            let (chain_id, account) = self.scope().await?;
            self.ctx
                .permit_store
                .set_active_permit_hash(chain_id, account, hash)
                .map_err(|e| {
                    CofheError::new(CofheErrorCode::PermitNotFound, format!("{e:#}")).with_cause(e)
                })
        })
        .await
    }

    pub async fn remove_permit(&self, hash: &str) -> CofheResult<()> {
        result_wrapper(async {
            let (chain_id, account) = self.scope().await?;
            self.ctx
                .permit_store
                .remove_permit(chain_id, account, hash)
                .map_err(store_failed)
        })
        .await
    }

    async fn scope(&self) -> Result<(u64, Address), CofheError> {
        self.ctx.await_connection().await?;
        Ok((
            self.ctx.resolve_chain_id(self.chain_id)?,
            self.ctx.resolve_account(self.account)?,
        ))
    }
}

pub(crate) fn invalid_permit(e: anyhow::Error) -> CofheError {
    CofheError::new(
        CofheErrorCode::InvalidPermitData,
        format!("Permit is not valid: {e:#}"),
    )
    .with_cause(e)
}

fn store_failed(e: anyhow::Error) -> CofheError {
    CofheError::new(
        CofheErrorCode::PermitStoreFailed,
        format!("Permit store failed: {e:#}"),
    )
    .with_cause(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StaticPermit(&'static str);

    impl Permit for StaticPermit {
        fn hash(&self) -> String {
            self.0.to_string()
        }

        fn issuer(&self) -> Address {
            Address::repeat_byte(1)
        }

        fn chain_id(&self) -> u64 {
            1
        }

        fn validate(&self) -> Result<()> {
            Ok(())
        }

        fn permission(&self) -> Value {
            Value::Null
        }

        fn unseal(&self, _sealed: &EncryptedPayload) -> Result<U256> {
            Ok(U256::ZERO)
        }
    }

    #[test]
    fn test_active_permit_lifecycle() -> Result<()> {
        let store = InMemoryPermitStore::new();
        let account = Address::repeat_byte(1);
        store.set_permit(1, account, Arc::new(StaticPermit("a")))?;
        store.set_permit(1, account, Arc::new(StaticPermit("b")))?;

        assert!(store.get_active_permit(1, account)?.is_none());
        store.set_active_permit_hash(1, account, "b")?;
        assert_eq!(store.get_active_permit(1, account)?.unwrap().hash(), "b");
        assert!(store.set_active_permit_hash(1, account, "missing").is_err());

        store.remove_permit(1, account, "b")?;
        assert!(store.get_active_permit(1, account)?.is_none());
        assert_eq!(store.get_permits(1, account)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_scoped_by_chain_and_account() -> Result<()> {
        let store = InMemoryPermitStore::new();
        let account = Address::repeat_byte(1);
        store.set_permit(1, account, Arc::new(StaticPermit("a")))?;

        assert!(store.get_permit(1, account, "a")?.is_some());
        assert!(store.get_permit(2, account, "a")?.is_none());
        assert!(store.get_permit(1, Address::repeat_byte(2), "a")?.is_none());
        assert!(store.get_permits(5, account)?.is_empty());
        Ok(())
    }
}
