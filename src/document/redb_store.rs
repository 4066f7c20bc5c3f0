//! Document store backed by redb embedded database.
//!
//! Each collection is its own redb table (key: document key, value: the
//! serialized session bytes).

use anyhow::Context;
use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::path::Path;
use tracing::debug;

use super::DocumentStore;
use crate::error::{persistence_error, Result};

fn collection_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// redb database holding one table per session collection.
pub struct RedbDocumentStore {
    db: Database,
}

impl RedbDocumentStore {
    /// Open or create a document store at the given path.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let db = Database::create(path)
            .with_context(|| format!("Failed to open session database: {:?}", path))?;

        debug!(path = ?path, "Opened session document store");

        Ok(Self { db })
    }

    /// Create a store that lives only in memory.
    pub fn in_memory() -> anyhow::Result<Self> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .context("Failed to create in-memory session database")?;
        Ok(Self { db })
    }
}

impl DocumentStore for RedbDocumentStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read().map_err(persistence_error)?;
        let table = match read_txn.open_table(collection_table(collection)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(persistence_error(e)),
        };

        let data = table
            .get(key)
            .map_err(persistence_error)?
            .map(|value| value.value().to_vec());
        Ok(data)
    }

    fn put(&self, collection: &str, key: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write().map_err(persistence_error)?;
        {
            let mut table = write_txn
                .open_table(collection_table(collection))
                .map_err(persistence_error)?;
            table.insert(key, data).map_err(persistence_error)?;
        }
        write_txn.commit().map_err(persistence_error)?;
        Ok(())
    }

    fn keys(&self, collection: &str) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read().map_err(persistence_error)?;
        let table = match read_txn.open_table(collection_table(collection)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(persistence_error(e)),
        };

        let mut keys = Vec::new();
        for entry in table.iter().map_err(persistence_error)? {
            let (key, _) = entry.map_err(persistence_error)?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let write_txn = self.db.begin_write().map_err(persistence_error)?;
        let removed = {
            let mut table = write_txn
                .open_table(collection_table(collection))
                .map_err(persistence_error)?;
            let result = table.remove(key).map_err(persistence_error)?;
            result.is_some()
        };
        write_txn.commit().map_err(persistence_error)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> (RedbDocumentStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.redb");
        let store = RedbDocumentStore::open(path).unwrap();
        (store, dir)
    }

    #[test]
    fn test_put_and_get() {
        let (store, _dir) = test_store();

        store.put("testname", "testname", b"payload").unwrap();
        assert_eq!(
            store.get("testname", "testname").unwrap(),
            Some(b"payload".to_vec())
        );
    }

    #[test]
    fn test_put_overwrites() {
        let (store, _dir) = test_store();

        store.put("c", "k", b"first").unwrap();
        store.put("c", "k", b"second").unwrap();
        assert_eq!(store.get("c", "k").unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.keys("c").unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_missing_collection_is_not_found() {
        let (store, _dir) = test_store();
        assert!(store.get("never-written", "k").unwrap().is_none());
        assert!(store.keys("never-written").unwrap().is_empty());
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let (store, _dir) = test_store();
        store.put("c", "k", b"x").unwrap();
        assert!(store.get("c", "other").unwrap().is_none());
    }

    #[test]
    fn test_collections_are_separate() {
        let (store, _dir) = test_store();
        store.put("a", "k", b"in-a").unwrap();
        store.put("b", "k", b"in-b").unwrap();
        assert_eq!(store.get("a", "k").unwrap(), Some(b"in-a".to_vec()));
        assert_eq!(store.get("b", "k").unwrap(), Some(b"in-b".to_vec()));
    }

    #[test]
    fn test_delete() {
        let (store, _dir) = test_store();
        store.put("c", "k1", b"1").unwrap();
        store.put("c", "k2", b"2").unwrap();

        assert!(store.delete("c", "k1").unwrap());
        assert!(!store.delete("c", "k1").unwrap());
        assert_eq!(store.keys("c").unwrap(), vec!["k2".to_string()]);
    }

    #[test]
    fn test_reopen_keeps_documents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.redb");
        {
            let store = RedbDocumentStore::open(&path).unwrap();
            store.put("c", "k", b"durable").unwrap();
        }
        let store = RedbDocumentStore::open(&path).unwrap();
        assert_eq!(store.get("c", "k").unwrap(), Some(b"durable".to_vec()));
    }

    #[test]
    fn test_in_memory() {
        let store = RedbDocumentStore::in_memory().unwrap();
        store.put("c", "k", b"x").unwrap();
        assert_eq!(store.get("c", "k").unwrap(), Some(b"x".to_vec()));
    }
}
