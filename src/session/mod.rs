//! Server-side HTTP sessions persisted as MessagePack documents.
//!
//! This module provides the session middleware backend, backed by a
//! [`DocumentStore`](crate::document::DocumentStore), with an in-process cache
//! of the last persisted values per session name.

pub mod bookings;
pub mod cache;
pub mod codec;
pub mod context;
pub mod store;
pub mod types;

pub use bookings::{extract_booking_ids, BookingIds, BOOKING_IDS_KEY};
pub use cache::{SessionCache, DEFAULT_CACHE_CAPACITY};
pub use codec::MAX_LENGTH;
pub use context::{RequestContext, ResponseHeaders};
pub use store::{SessionBackend, SessionStore};
pub use types::{Session, SessionValues, Value};
