//! Session store backed by a document store.
//!
//! Provides the session middleware backend with:
//! - MessagePack documents capped at [`MAX_LENGTH`](super::codec::MAX_LENGTH)
//! - In-memory cache of the last persisted values per session name
//! - Bulk cleanup of a session collection

use tracing::{debug, warn};

use super::cache::SessionCache;
use super::codec;
use super::context::{session_cookie, RequestContext, ResponseHeaders};
use super::types::{session_id_for, Session, SessionValues};
use crate::document::DocumentStore;
use crate::error::Result;

/// Backend contract expected by the session middleware.
pub trait SessionBackend {
    /// Session for `name`: cached, loaded from the store, or fresh.
    fn new_session(&self, ctx: &RequestContext, name: &str) -> Result<Session>;

    /// Session for `name` read from the backing store.
    fn get(&self, ctx: &RequestContext, name: &str) -> Result<Session>;

    /// Persist the session values.
    fn save(
        &self,
        ctx: &RequestContext,
        response: &mut ResponseHeaders,
        session: &mut Session,
    ) -> Result<()>;
}

/// Session store with in-memory cache and persistent document storage.
pub struct SessionStore<D> {
    documents: D,
    cache: SessionCache,
}

impl<D: DocumentStore> SessionStore<D> {
    /// Create a store over `documents`, sharing `cache` with whoever else
    /// holds a clone of it.
    pub fn new(documents: D, cache: SessionCache) -> Self {
        Self { documents, cache }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    /// Fetch and decode the persisted values for `name`.
    pub fn load(&self, ctx: &RequestContext, name: &str) -> Result<Option<SessionValues>> {
        ctx.check()?;
        let Some(data) = self.documents.get(name, &session_id_for(name))? else {
            return Ok(None);
        };
        let values = codec::decode(&data)?;
        Ok(Some(values))
    }

    /// Delete one session document and its cache entry.
    pub fn delete(&self, ctx: &RequestContext, session: &Session) -> Result<bool> {
        ctx.check()?;
        self.cache.remove_through(session.name(), || {
            self.documents.delete(session.name(), &session.id)
        })
    }

    /// Delete every document in the `name` collection.
    ///
    /// Failures on individual documents are logged and skipped. Returns the
    /// number of documents deleted.
    pub fn cleanup(&self, ctx: &RequestContext, name: &str) -> usize {
        self.cache
            .remove_through(name, || Ok(self.delete_collection(ctx, name)))
            .unwrap_or_default()
    }

    fn delete_collection(&self, ctx: &RequestContext, name: &str) -> usize {
        if let Err(e) = ctx.check() {
            warn!(name = %name, error = %e, "Session cleanup skipped");
            return 0;
        }

        let keys = match self.documents.keys(name) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to list session documents");
                return 0;
            }
        };

        let mut deleted = 0;
        for key in keys {
            if let Err(e) = ctx.check() {
                warn!(name = %name, key = %key, error = %e, "Session cleanup interrupted");
                break;
            }
            match self.documents.delete(name, &key) {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        name = %name,
                        key = %key,
                        error = %e,
                        "Failed to delete session document"
                    );
                }
            }
        }

        debug!(name = %name, deleted, "Session collection cleaned up");
        deleted
    }
}

impl<D: DocumentStore> SessionBackend for SessionStore<D> {
    fn new_session(&self, ctx: &RequestContext, name: &str) -> Result<Session> {
        // Check cache first
        if let Some(values) = self.cache.get(name) {
            debug!(name = %name, "Session cache hit");
            return Ok(Session::hydrate(name, values));
        }

        debug!(name = %name, "Session cache miss");
        match self.load(ctx, name)? {
            Some(values) => Ok(Session::hydrate(name, values)),
            None => Ok(Session::new(name)),
        }
    }

    fn get(&self, ctx: &RequestContext, name: &str) -> Result<Session> {
        match self.load(ctx, name)? {
            Some(values) => Ok(Session::hydrate(name, values)),
            None => Ok(Session::new(name)),
        }
    }

    fn save(
        &self,
        ctx: &RequestContext,
        response: &mut ResponseHeaders,
        session: &mut Session,
    ) -> Result<()> {
        let data = codec::encode(&session.values)?;

        ctx.check()?;
        // Only cache what the store accepted
        self.cache
            .write_through(session.name(), session.values.clone(), || {
                self.documents.put(session.name(), &session.id, &data)
            })?;
        session.is_new = false;

        response.append("Set-Cookie", session_cookie(session.name(), &session.id));
        debug!(name = %session.name(), bytes = data.len(), "Session saved");
        Ok(())
    }
}
