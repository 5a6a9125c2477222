// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::KeyValStore;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataOp {
    Insert(String, Vec<u8>),
    Remove(String),
}

/// Process local store. With `capture` enabled every write is recorded so tests can assert on
/// exactly what was persisted.
#[derive(Debug, Default)]
pub struct InMemStore {
    db: Mutex<BTreeMap<String, Vec<u8>>>,
    log: Mutex<Vec<DataOp>>,
    capture: bool,
}

impl InMemStore {
    pub fn new(capture: bool) -> Self {
        Self {
            db: Mutex::new(BTreeMap::new()),
            log: Mutex::new(vec![]),
            capture,
        }
    }

    pub fn get_log(&self) -> Result<Vec<DataOp>> {
        Ok(self
            .log
            .lock()
            .map_err(|_| anyhow!("InMemStore log lock poisoned"))?
            .clone())
    }

    fn record(&self, op: DataOp) -> Result<()> {
        if self.capture {
            self.log
                .lock()
                .map_err(|_| anyhow!("InMemStore log lock poisoned"))?
                .push(op);
        }
        Ok(())
    }
}

impl KeyValStore for InMemStore {
    fn insert(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.db
            .lock()
            .map_err(|_| anyhow!("InMemStore lock poisoned"))?
            .insert(key.to_owned(), value.clone());
        self.record(DataOp::Insert(key.to_owned(), value))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .db
            .lock()
            .map_err(|_| anyhow!("InMemStore lock poisoned"))?
            .get(key)
            .cloned())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .lock()
            .map_err(|_| anyhow!("InMemStore lock poisoned"))?
            .remove(key);
        self.record(DataOp::Remove(key.to_owned()))
    }
}
