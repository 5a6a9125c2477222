// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use sled::Tree;
use std::path::PathBuf;

use crate::{sled_utils::get_or_open_db_tree, KeyValStore};

/// Store that survives process restarts
pub struct SledStore {
    db: Tree,
}

impl SledStore {
    pub fn new(path: &PathBuf, tree: &str) -> Result<Self> {
        let db = get_or_open_db_tree(path, tree)?;
        Ok(Self { db })
    }
}

impl KeyValStore for SledStore {
    fn insert(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value)
            .context("Could not insert data into db")?;
        self.db.flush().context("Could not flush db")?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let res = self
            .db
            .get(key.as_bytes())
            .with_context(|| format!("Failed to fetch {}", key))?;

        Ok(res.map(|v| v.to_vec()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .context("Could not remove data from db")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sled_store_shares_connections() -> Result<()> {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let db_path = temp_dir.path().join("keys.db");

        let db1 = SledStore::new(&db_path, "keys")?;
        db1.insert("test_key", b"test_value".to_vec())?;

        let db2 = SledStore::new(&db_path, "keys")?;
        assert_eq!(db2.get("test_key")?, Some(b"test_value".to_vec()));

        db2.remove("test_key")?;
        assert_eq!(db1.get("test_key")?, None);

        let other = SledStore::new(&temp_dir.path().join("other.db"), "keys")?;
        db1.insert("only_here", vec![1])?;
        assert!(other.get("only_here")?.is_none());
        Ok(())
    }
}
