//! Request and response handles passed through the session backend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::{Result, SessionError};

/// Per-request context. Bounds every document store call by an optional
/// deadline; the store checks it before each call and never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context without a deadline.
    pub fn background() -> Self {
        Self { deadline: None }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail once the deadline has passed.
    pub fn check(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(SessionError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

/// Response headers collected while handling a request.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    headers: HashMap<String, Vec<String>>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.entry(name.into()).or_default().push(value.into());
    }

    /// All values for a header, matched case-insensitively.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .flat_map(|(_, values)| values.iter().map(String::as_str))
            .collect()
    }

    pub fn into_inner(self) -> HashMap<String, Vec<String>> {
        self.headers
    }
}

/// `Set-Cookie` value pointing the browser at a session document.
pub(crate) fn session_cookie(name: &str, id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", name, id)
}
