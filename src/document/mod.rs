//! Document store abstraction.
//!
//! Sessions are stored as documents grouped into named collections. The
//! session store only needs keyed read/overwrite, enumeration and delete.

mod redb_store;

pub use redb_store::RedbDocumentStore;

use crate::error::Result;

/// Backing store for serialized session documents.
pub trait DocumentStore: Send + Sync {
    /// Read one document. A missing collection or key is `Ok(None)`.
    fn get(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write or overwrite one document atomically.
    fn put(&self, collection: &str, key: &str, data: &[u8]) -> Result<()>;

    /// Keys of every document in a collection.
    fn keys(&self, collection: &str) -> Result<Vec<String>>;

    /// Delete one document. Returns whether it existed.
    fn delete(&self, collection: &str, key: &str) -> Result<bool>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(collection, key)
    }

    fn put(&self, collection: &str, key: &str, data: &[u8]) -> Result<()> {
        (**self).put(collection, key, data)
    }

    fn keys(&self, collection: &str) -> Result<Vec<String>> {
        (**self).keys(collection)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        (**self).delete(collection, key)
    }
}
