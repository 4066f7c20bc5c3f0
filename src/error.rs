//! Error kinds surfaced by the session store.

use thiserror::Error;

/// Errors returned by the serializer, the store and the booking-ID extractor.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Encoding succeeded but the document is larger than the store accepts.
    #[error("session exceeds max length: encoded {actual} bytes, limit is {limit} bytes")]
    MaxLengthExceeded { actual: usize, limit: usize },

    #[error("failed to encode session values: {0}")]
    Encoding(#[source] rmp_serde::encode::Error),

    #[error("failed to decode session document: {0}")]
    Decoding(#[source] rmp_serde::decode::Error),

    /// Backing document store I/O failure.
    #[error("document store error: {0}")]
    Persistence(#[from] redb::Error),

    #[error("session is missing")]
    NilSession,

    #[error("session value '{key}' has wrong type: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: String,
    },

    #[error("request deadline exceeded before document store call")]
    DeadlineExceeded,
}

impl SessionError {
    /// True for the size-ceiling failure, as opposed to malformed data.
    pub fn is_max_length(&self) -> bool {
        matches!(self, SessionError::MaxLengthExceeded { .. })
    }
}

/// Map any redb error into a persistence failure.
pub(crate) fn persistence_error(error: impl Into<redb::Error>) -> SessionError {
    SessionError::Persistence(error.into())
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
