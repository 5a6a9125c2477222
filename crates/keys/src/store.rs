// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, Context, Result};
use cofhe_config::StoreKeys;
use cofhe_data::KeyValStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Persisted shape of the cache: `{fhe: {chain_id: {security_zone: bytes}}, crs: {chain_id: bytes}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysState {
    pub fhe: BTreeMap<u64, BTreeMap<u8, Vec<u8>>>,
    pub crs: BTreeMap<u64, Vec<u8>>,
}

/// Cache of fhe public keys (per chain and security zone) and crs blobs (per chain).
///
/// The full state is held in memory and written through to the backing store on every change,
/// so a cache built over a persistent store survives process restarts.
pub struct KeysStore {
    state: RwLock<KeysState>,
    backing: Arc<dyn KeyValStore>,
    key: String,
}

impl KeysStore {
    /// Create the cache, hydrating from whatever `backing` already holds.
    pub fn new(backing: Arc<dyn KeyValStore>) -> Result<Self> {
        let key = StoreKeys::keys();
        let state = match backing.get(&key)? {
            Some(bytes) => {
                bincode::deserialize(&bytes).context("Could not deserialize persisted keys")?
            }
            None => KeysState::default(),
        };
        debug!(
            chains = state.crs.len().max(state.fhe.len()),
            "Hydrated keys store"
        );
        Ok(Self {
            state: RwLock::new(state),
            backing,
            key,
        })
    }

    pub fn get_fhe_key(&self, chain_id: u64, security_zone: u8) -> Result<Option<Vec<u8>>> {
        Ok(self
            .read()?
            .fhe
            .get(&chain_id)
            .and_then(|zones| zones.get(&security_zone))
            .cloned())
    }

    pub fn get_crs(&self, chain_id: u64) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.crs.get(&chain_id).cloned())
    }

    pub fn set_fhe_key(&self, chain_id: u64, security_zone: u8, key: Vec<u8>) -> Result<()> {
        self.update(|state| {
            state
                .fhe
                .entry(chain_id)
                .or_default()
                .insert(security_zone, key);
        })
    }

    pub fn set_crs(&self, chain_id: u64, crs: Vec<u8>) -> Result<()> {
        self.update(|state| {
            state.crs.insert(chain_id, crs);
        })
    }

    /// Drop every cached key and crs, including the persisted copy.
    pub fn clear(&self) -> Result<()> {
        *self.write()? = KeysState::default();
        self.backing.remove(&self.key)
    }

    pub fn snapshot(&self) -> Result<KeysState> {
        Ok(self.read()?.clone())
    }

    fn update(&self, f: impl FnOnce(&mut KeysState)) -> Result<()> {
        let mut state = self.write()?;
        f(&mut state);
        let bytes = bincode::serialize(&*state).context("Could not serialize keys")?;
        self.backing.insert(&self.key, bytes)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, KeysState>> {
        self.state
            .read()
            .map_err(|_| anyhow!("Keys store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, KeysState>> {
        self.state
            .write()
            .map_err(|_| anyhow!("Keys store lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cofhe_data::{DataOp, InMemStore, SledStore};
    use tempfile::tempdir;

    #[test]
    fn test_partitioned_by_chain_and_zone() -> Result<()> {
        let store = KeysStore::new(Arc::new(InMemStore::new(false)))?;
        store.set_fhe_key(1, 0, vec![1])?;
        store.set_fhe_key(1, 1, vec![2])?;
        store.set_fhe_key(2, 0, vec![3])?;
        store.set_crs(1, vec![9])?;

        assert_eq!(store.get_fhe_key(1, 0)?, Some(vec![1]));
        assert_eq!(store.get_fhe_key(1, 1)?, Some(vec![2]));
        assert_eq!(store.get_fhe_key(2, 0)?, Some(vec![3]));
        assert_eq!(store.get_fhe_key(2, 1)?, None);
        assert_eq!(store.get_crs(1)?, Some(vec![9]));
        assert_eq!(store.get_crs(2)?, None);
        Ok(())
    }

    #[test]
    fn test_writes_through_under_namespace() -> Result<()> {
        let backing = Arc::new(InMemStore::new(true));
        let store = KeysStore::new(backing.clone())?;
        store.set_crs(5, vec![7, 7])?;

        let log = backing.get_log()?;
        assert_eq!(log.len(), 1);
        let DataOp::Insert(key, bytes) = &log[0] else {
            panic!("expected an insert, got {:?}", log[0]);
        };
        assert_eq!(key, "cofhe-keys");
        let persisted: KeysState = bincode::deserialize(bytes)?;
        assert_eq!(persisted.crs.get(&5), Some(&vec![7, 7]));
        Ok(())
    }

    #[test]
    fn test_hydrates_from_sled_after_restart() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("db");
        {
            let backing = Arc::new(SledStore::new(&path, "keys")?);
            let store = KeysStore::new(backing)?;
            store.set_fhe_key(11155111, 0, b"pk".to_vec())?;
            store.set_crs(11155111, b"crs".to_vec())?;
        }

        let backing = Arc::new(SledStore::new(&path, "keys")?);
        let store = KeysStore::new(backing)?;
        assert_eq!(store.get_fhe_key(11155111, 0)?, Some(b"pk".to_vec()));
        assert_eq!(store.get_crs(11155111)?, Some(b"crs".to_vec()));
        Ok(())
    }

    #[test]
    fn test_clear_removes_persisted_state() -> Result<()> {
        let backing = Arc::new(InMemStore::new(false));
        let store = KeysStore::new(backing.clone())?;
        store.set_fhe_key(1, 0, vec![1])?;
        store.clear()?;

        assert_eq!(store.get_fhe_key(1, 0)?, None);
        assert_eq!(backing.get("cofhe-keys")?, None);
        assert_eq!(KeysStore::new(backing)?.snapshot()?, KeysState::default());
        Ok(())
    }
}
