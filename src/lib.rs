//! Zentinel session store
//!
//! Server-side HTTP session storage for the Zentinel proxy agents. Session
//! values are encoded as size-capped MessagePack documents and kept in a redb
//! document store, one collection per session cookie name.

pub mod config;
pub mod document;
pub mod error;
pub mod session;

pub use config::{StoreConfig, StoreConfigJson};
pub use document::{DocumentStore, RedbDocumentStore};
pub use error::SessionError;
pub use session::{
    extract_booking_ids, BookingIds, RequestContext, ResponseHeaders, Session, SessionBackend,
    SessionCache, SessionStore, SessionValues, Value,
};
