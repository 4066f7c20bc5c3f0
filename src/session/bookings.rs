//! Typed view over the booking IDs kept in session values.

use std::ops::Deref;

use super::types::{Session, Value};
use crate::error::{Result, SessionError};

/// Reserved session key holding the booking IDs.
pub const BOOKING_IDS_KEY: &str = "bookingIds";

const EXPECTED_SHAPE: &str = "list of strings";

/// Ordered booking identifiers. Order and duplicates are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingIds(Vec<String>);

impl BookingIds {
    pub fn new(ids: Vec<String>) -> Self {
        Self(ids)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for BookingIds {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for BookingIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<BookingIds> for Value {
    fn from(ids: BookingIds) -> Self {
        Value::List(ids.0.into_iter().map(Value::String).collect())
    }
}

impl TryFrom<&Value> for BookingIds {
    type Error = SessionError;

    fn try_from(value: &Value) -> Result<Self> {
        let Value::List(items) = value else {
            return Err(mismatch(value.kind().to_string()));
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(id) => Ok(id.clone()),
                other => Err(mismatch(format!("list containing {}", other.kind()))),
            })
            .collect::<Result<Vec<_>>>()
            .map(BookingIds)
    }
}

fn mismatch(actual: String) -> SessionError {
    SessionError::TypeMismatch {
        key: BOOKING_IDS_KEY.to_string(),
        expected: EXPECTED_SHAPE,
        actual,
    }
}

/// Read the booking IDs stored in a session.
///
/// A missing session is a caller error. A session without booking IDs yields
/// `Ok(None)`. Any stored value that is not a list of strings is rejected.
pub fn extract_booking_ids(session: Option<&Session>) -> Result<Option<BookingIds>> {
    let session = session.ok_or(SessionError::NilSession)?;
    session
        .get(BOOKING_IDS_KEY)
        .map(BookingIds::try_from)
        .transpose()
}

impl Session {
    /// Replace the booking IDs stored in this session.
    pub fn set_booking_ids(&mut self, ids: BookingIds) {
        self.insert(BOOKING_IDS_KEY, ids);
    }
}
