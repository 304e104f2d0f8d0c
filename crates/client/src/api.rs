//! HTTP client for the Pogo job web service.
//!
//! Wraps the read-only `/jobs` and `/jobs/{jobid}` endpoints using
//! [`reqwest`]. Each call fills the endpoint template with the service
//! root, the query string and a fresh callback token, performs a single
//! GET, and decodes the envelope.

use std::time::Duration;

use async_trait::async_trait;
use pogo_core::env::{sub, Env, JOBS_WS, JOB_WS};
use pogo_core::error::{FetchCause, FetchError, Resource};
use pogo_core::types::{Query, Record};
use reqwest::Url;

use crate::envelope::{decode_job, decode_jobs};
use crate::source::{FetchedJobs, JobSource};

/// Client-side timeout applied to every request unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Prefix of generated callback tokens.
const CALLBACK_PREFIX: &str = "pogo_cb_";

/// Errors raised while constructing a [`PogoApi`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured web-service root is not a valid URL.
    #[error("Invalid web service root {url}: {reason}")]
    InvalidRoot { url: String, reason: String },

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// HTTP client for one Pogo web service.
pub struct PogoApi {
    client: reqwest::Client,
    env: Env,
    ws_root: Url,
}

impl PogoApi {
    /// Create a client for `env.ws_root` with the given request timeout.
    pub fn new(env: Env, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, env)
    }

    /// Create a client reusing an existing [`reqwest::Client`]. The
    /// client's own timeout settings apply.
    pub fn with_client(client: reqwest::Client, env: Env) -> Result<Self, ClientError> {
        let ws_root = Url::parse(&env.ws_root).map_err(|e| ClientError::InvalidRoot {
            url: env.ws_root.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            env,
            ws_root,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// URL for a `/jobs` read of `query` with callback token `callback`.
    pub fn jobs_url(&self, query: &Query, callback: &str) -> String {
        sub(
            JOBS_WS,
            &[
                ("root", &self.env.ws_root),
                ("params", &self.encode_params(query)),
                ("callback", callback),
            ],
        )
    }

    /// URL for a `/jobs/{jobid}` read with callback token `callback`.
    pub fn job_url(&self, jobid: &str, callback: &str) -> String {
        // Percent-encode the id as a single path segment.
        let mut scratch = self.ws_root.clone();
        scratch.set_query(None);
        scratch.set_path("");
        if let Ok(mut segments) = scratch.path_segments_mut() {
            segments.pop_if_empty().push(jobid);
        }
        let encoded = scratch.path().trim_start_matches('/').to_string();
        sub(
            JOB_WS,
            &[
                ("root", &self.env.ws_root),
                ("jobid", &encoded),
                ("callback", callback),
            ],
        )
    }

    // ---- private helpers ----

    /// `application/x-www-form-urlencoded` rendering of `query`.
    fn encode_params(&self, query: &Query) -> String {
        let mut scratch = self.ws_root.clone();
        scratch.query_pairs_mut().clear().extend_pairs(query.pairs());
        scratch.query().unwrap_or_default().to_string()
    }

    /// Perform one GET and return the body text.
    async fn get_body(&self, url: &str, resource: Resource) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(resource, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(resource, FetchCause::Status(status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| transport_error(resource, e))
    }
}

#[async_trait]
impl JobSource for PogoApi {
    async fn fetch_jobs(&self, query: &Query) -> Result<FetchedJobs, FetchError> {
        let callback = callback_token();
        let url = self.jobs_url(query, &callback);

        let result = match self.get_body(&url, Resource::Jobs).await {
            Ok(body) => decode_jobs(&body, &callback),
            Err(e) => Err(e),
        };

        match &result {
            Ok(fetched) => tracing::debug!(
                url = %url,
                count = fetched.records.len(),
                reported_total = ?fetched.reported_total,
                "Fetched jobs",
            ),
            Err(e) => tracing::warn!(url = %url, cause = %e.cause, "{e}"),
        }
        result
    }

    async fn fetch_job(&self, jobid: &str) -> Result<Record, FetchError> {
        let callback = callback_token();
        let url = self.job_url(jobid, &callback);

        let result = match self.get_body(&url, Resource::Job).await {
            Ok(body) => decode_job(&body, &callback),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => tracing::debug!(url = %url, jobid, "Fetched job"),
            Err(e) => tracing::warn!(url = %url, jobid, cause = %e.cause, "{e}"),
        }
        result
    }
}

/// A fresh callback / cache-busting token for one request.
pub fn callback_token() -> String {
    format!("{CALLBACK_PREFIX}{}", uuid::Uuid::new_v4().simple())
}

fn transport_error(resource: Resource, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::timeout(resource)
    } else {
        FetchError::new(resource, FetchCause::Transport(err.to_string()))
    }
}
