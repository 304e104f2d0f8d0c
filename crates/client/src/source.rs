//! The read-only job source seam.
//!
//! Collections and views depend on [`JobSource`] rather than on the HTTP
//! client directly, so tests can substitute in-memory or gated sources.

use async_trait::async_trait;
use pogo_core::error::{ensure_read, CoreError, FetchError, SyncAction};
use pogo_core::types::{Query, Record};

/// Result of one `/jobs` read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedJobs {
    /// Records in server response order.
    pub records: Vec<Record>,
    /// `meta.count` when the server reported one.
    pub reported_total: Option<u64>,
}

/// A read-only source of job records.
///
/// One call issues exactly one request. Implementations never retry.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Read the job collection matching `query`.
    async fn fetch_jobs(&self, query: &Query) -> Result<FetchedJobs, FetchError>;

    /// Read a single job by id.
    async fn fetch_job(&self, jobid: &str) -> Result<Record, FetchError>;

    /// Synchronise the collection for `action`. Only reads are supported.
    async fn sync(&self, action: SyncAction, query: &Query) -> Result<FetchedJobs, CoreError> {
        ensure_read(action)?;
        Ok(self.fetch_jobs(query).await?)
    }
}
