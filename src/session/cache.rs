//! In-process cache of the last persisted values per session name.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use tracing::debug;

use super::types::SessionValues;
use crate::error::Result;

/// Default maximum number of session names kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

struct CacheEntry {
    values: SessionValues,
    /// Write sequence number, for eviction.
    written: u64,
}

struct Inner {
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Serializes store writes with their cache updates. Readers never take it.
    writers: Mutex<()>,
    capacity: usize,
    clock: AtomicU64,
}

/// Shared handle to a name → persisted-values map.
///
/// Clones share the same entries. Use [`SessionCache::new`] for a cache owned
/// by one store, or [`SessionCache::global`] to share across every store in
/// the process.
#[derive(Clone)]
pub struct SessionCache {
    inner: Arc<Inner>,
}

impl SessionCache {
    /// Create an independent cache holding at most `capacity` names.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                writers: Mutex::new(()),
                capacity: capacity.max(1),
                clock: AtomicU64::new(0),
            }),
        }
    }

    /// The process-wide cache.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<SessionCache> = OnceLock::new();
        GLOBAL
            .get_or_init(|| SessionCache::new(DEFAULT_CACHE_CAPACITY))
            .clone()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Last persisted values for `name`, if cached.
    pub fn get(&self, name: &str) -> Option<SessionValues> {
        let cache = self.inner.entries.read().ok()?;
        cache.get(name).map(|entry| entry.values.clone())
    }

    /// Record the values just persisted for `name`.
    pub fn insert(&self, name: &str, values: SessionValues) {
        let written = self.inner.clock.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut cache) = self.inner.entries.write() {
            if !cache.contains_key(name) && cache.len() >= self.inner.capacity {
                evict_oldest(&mut cache);
            }
            cache.insert(name.to_string(), CacheEntry { values, written });
        }
    }

    /// Run `persist` and, if it succeeds, record `values` for `name`.
    ///
    /// Writers sharing this cache go through one at a time, so the last
    /// persisted values and the cached values are always the same.
    pub fn write_through<T>(
        &self,
        name: &str,
        values: SessionValues,
        persist: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let _writer = self
            .inner
            .writers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let output = persist()?;
        self.insert(name, values);
        Ok(output)
    }

    /// Run `remove_persisted` and drop the cache entry for `name`, in step
    /// with other writers. The entry is dropped even if removal fails.
    pub fn remove_through<T>(
        &self,
        name: &str,
        remove_persisted: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let _writer = self
            .inner
            .writers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let output = remove_persisted();
        self.remove(name);
        output
    }

    pub fn remove(&self, name: &str) -> bool {
        match self.inner.entries.write() {
            Ok(mut cache) => cache.remove(name).is_some(),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Drop the entry written longest ago.
fn evict_oldest(cache: &mut HashMap<String, CacheEntry>) {
    if let Some(oldest) = cache
        .iter()
        .min_by_key(|(_, entry)| entry.written)
        .map(|(name, _)| name.clone())
    {
        debug!(name = %oldest, "Evicting session from cache");
        cache.remove(&oldest);
    }
}
