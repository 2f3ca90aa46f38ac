//! Error types for the Spacewalk query crate.

use crate::xmlrpc::XmlRpcError;
use std::fmt;

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpacewalkErrorKind {
    /// Login failed, the endpoint is unusable, or no session token came back
    AuthenticationError,
    /// A listing / resolution call failed after the session was established
    RemoteQueryError,
    /// No system carries the requested name
    NotFound,
    /// A returned record lacks an expected field
    MalformedRecord,
    /// Caller supplied an unusable argument
    InvalidArgument,
}

/// Crate error type carrying a kind + human-readable message.
#[derive(Debug, Clone)]
pub struct SpacewalkError {
    pub kind: SpacewalkErrorKind,
    pub message: String,
}

impl SpacewalkError {
    pub fn new(kind: SpacewalkErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(SpacewalkErrorKind::AuthenticationError, msg)
    }

    pub fn remote_query(msg: impl Into<String>) -> Self {
        Self::new(SpacewalkErrorKind::RemoteQueryError, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(SpacewalkErrorKind::NotFound, msg)
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new(SpacewalkErrorKind::MalformedRecord, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(SpacewalkErrorKind::InvalidArgument, msg)
    }

    /// Wrap a failed remote call made while a session is live.
    pub fn from_query(method: &str, err: XmlRpcError) -> Self {
        Self::remote_query(format!("{method} failed: {err}"))
    }

    pub fn is_auth(&self) -> bool {
        self.kind == SpacewalkErrorKind::AuthenticationError
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == SpacewalkErrorKind::NotFound
    }
}

impl fmt::Display for SpacewalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for SpacewalkError {}

impl From<SpacewalkError> for String {
    fn from(e: SpacewalkError) -> String {
        e.to_string()
    }
}

/// Convenience alias.
pub type SpacewalkResult<T> = Result<T, SpacewalkError>;
