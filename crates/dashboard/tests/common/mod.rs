#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pogo_client::source::{FetchedJobs, JobSource};
use pogo_core::error::{FetchError, Resource};
use pogo_core::types::{Query, Record};
use serde_json::{json, Value};
use tokio::sync::oneshot;

pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record must be a JSON object")
}

/// `n` jobs for `user`, the first `running` of which are active.
pub fn jobs_for(user: &str, n: usize, running: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            record(json!({
                "jobid": format!("{user}-{i:03}"),
                "user": user,
                "state": if i < running { "running" } else { "finished" },
                "start_time": 1_330_000_000 + i,
                "command": "uptime",
                "range": ["web1", "web2"],
                "host_count": 2,
            }))
        })
        .collect()
}

/// Poll `check` until it holds, failing the test after two seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// Serves a fixed set of jobs, filtering on `user` and `active=1` the way
/// the web service does. `max` is ignored so paging happens client side.
#[derive(Default)]
pub struct MemorySource {
    jobs: Vec<Record>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new(jobs: Vec<Record>) -> Self {
        Self {
            jobs,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobSource for MemorySource {
    async fn fetch_jobs(&self, query: &Query) -> Result<FetchedJobs, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let records = self
            .jobs
            .iter()
            .filter(|job| query.get("user").map_or(true, |u| job["user"] == json!(u)))
            .filter(|job| query.get("active") != Some("1") || job["state"] == json!("running"))
            .cloned()
            .collect();
        Ok(FetchedJobs {
            records,
            reported_total: None,
        })
    }

    async fn fetch_job(&self, jobid: &str) -> Result<Record, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.jobs
            .iter()
            .find(|job| job["jobid"] == json!(jobid))
            .cloned()
            .ok_or_else(|| FetchError::malformed(Resource::Job, "response.job missing"))
    }
}

// ---------------------------------------------------------------------------
// Panicking source
// ---------------------------------------------------------------------------

/// A source whose every read panics.
pub struct PanickingSource;

#[async_trait]
impl JobSource for PanickingSource {
    async fn fetch_jobs(&self, _query: &Query) -> Result<FetchedJobs, FetchError> {
        panic!("job source failed")
    }

    async fn fetch_job(&self, _jobid: &str) -> Result<Record, FetchError> {
        panic!("job source failed")
    }
}

// ---------------------------------------------------------------------------
// Gated source
// ---------------------------------------------------------------------------

/// Holds each `/jobs` read open until the test releases it. Reads are keyed
/// by their `user` parameter.
pub struct GatedSource {
    gates: Mutex<HashMap<String, oneshot::Receiver<FetchedJobs>>>,
}

impl GatedSource {
    /// A source with one gate per user, plus the senders that release them.
    pub fn new(users: &[&str]) -> (Self, HashMap<String, oneshot::Sender<FetchedJobs>>) {
        let mut gates = HashMap::new();
        let mut releases = HashMap::new();
        for user in users {
            let (tx, rx) = oneshot::channel();
            gates.insert(user.to_string(), rx);
            releases.insert(user.to_string(), tx);
        }
        (
            Self {
                gates: Mutex::new(gates),
            },
            releases,
        )
    }
}

#[async_trait]
impl JobSource for GatedSource {
    async fn fetch_jobs(&self, query: &Query) -> Result<FetchedJobs, FetchError> {
        let user = query.get("user").unwrap_or_default().to_string();
        let gate = self.gates.lock().unwrap().remove(&user);
        match gate {
            Some(gate) => gate.await.map_err(|_| FetchError::timeout(Resource::Jobs)),
            None => Err(FetchError::timeout(Resource::Jobs)),
        }
    }

    async fn fetch_job(&self, _jobid: &str) -> Result<Record, FetchError> {
        Err(FetchError::timeout(Resource::Job))
    }
}
