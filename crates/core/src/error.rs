//! Error taxonomy shared by every layer of the dashboard.
//!
//! Fetch failures carry the human-readable message shown in place of a
//! table (`Could not load jobs`) plus the underlying cause for logs.

use std::fmt;

/// Which remote resource a fetch was reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The paginated `/jobs` collection.
    Jobs,
    /// A single `/jobs/{jobid}` record.
    Job,
}

impl Resource {
    /// The message surfaced to users when loading this resource fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Resource::Jobs => "Could not load jobs",
            Resource::Job => "Could not load job",
        }
    }
}

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    /// Network, DNS, TLS or body read failure.
    Transport(String),
    /// The client-side timeout elapsed before a response arrived.
    Timeout,
    /// The server answered with a non-2xx status code.
    Status(u16),
    /// The payload did not contain the expected envelope field.
    Malformed(String),
}

impl fmt::Display for FetchCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchCause::Transport(msg) => write!(f, "transport error: {msg}"),
            FetchCause::Timeout => f.write_str("request timed out"),
            FetchCause::Status(status) => write!(f, "unexpected status {status}"),
            FetchCause::Malformed(msg) => write!(f, "malformed payload: {msg}"),
        }
    }
}

/// A failed read against the job web service.
///
/// `Display` yields only the user-facing message; use [`FetchError::cause`]
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .resource.failure_message())]
pub struct FetchError {
    pub resource: Resource,
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(resource: Resource, cause: FetchCause) -> Self {
        Self { resource, cause }
    }

    pub fn malformed(resource: Resource, detail: impl Into<String>) -> Self {
        Self::new(resource, FetchCause::Malformed(detail.into()))
    }

    pub fn timeout(resource: Resource) -> Self {
        Self::new(resource, FetchCause::Timeout)
    }

    pub fn cause(&self) -> &FetchCause {
        &self.cause
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The caller asked a read-only resource to do something other than read.
    #[error("Invalid Action: {0}")]
    InvalidQuery(String),
}

/// Actions a data model can be asked to synchronise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Read,
    Create,
    Update,
    Delete,
}

impl SyncAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncAction::Read => "read",
            SyncAction::Create => "create",
            SyncAction::Update => "update",
            SyncAction::Delete => "delete",
        }
    }
}

/// Reject every action except [`SyncAction::Read`].
pub fn ensure_read(action: SyncAction) -> Result<(), CoreError> {
    match action {
        SyncAction::Read => Ok(()),
        other => Err(CoreError::InvalidQuery(other.as_str().to_string())),
    }
}
