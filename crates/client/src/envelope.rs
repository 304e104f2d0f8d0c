//! Decoding of web-service response bodies.
//!
//! Bodies are either plain JSON or JSON wrapped in a `callback(...)` call.
//! The useful payload sits under `response.jobs` or `response.job`.

use pogo_core::error::{FetchError, Resource};
use pogo_core::job::normalize_job;
use pogo_core::types::Record;
use serde::Deserialize;
use serde_json::Value;

use crate::source::FetchedJobs;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    response: Option<Value>,
    /// Only `meta.count` is read, and only when it is a non-negative integer.
    #[serde(default)]
    meta: Option<Value>,
}

/// Strip a `callback(...)` wrapper (with optional trailing `;`) if the body
/// carries one for `callback`.
pub fn unwrap_jsonp<'a>(body: &'a str, callback: &str) -> &'a str {
    let trimmed = body.trim();
    trimmed
        .strip_prefix(callback)
        .and_then(|rest| rest.trim_start().strip_prefix('('))
        .and_then(|rest| {
            let rest = rest.trim_end();
            let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
            rest.strip_suffix(')').map(str::trim)
        })
        .unwrap_or(trimmed)
}

fn parse_envelope(body: &str, callback: &str, resource: Resource) -> Result<Envelope, FetchError> {
    serde_json::from_str(unwrap_jsonp(body, callback))
        .map_err(|e| FetchError::malformed(resource, format!("invalid JSON: {e}")))
}

/// Decode a `/jobs` body into records plus the reported total.
///
/// `response.jobs` must be an array. Array items that are not objects are
/// dropped.
pub fn decode_jobs(body: &str, callback: &str) -> Result<FetchedJobs, FetchError> {
    let envelope = parse_envelope(body, callback, Resource::Jobs)?;

    let jobs = match envelope.response.as_ref().and_then(|r| r.get("jobs")) {
        Some(Value::Array(jobs)) => jobs,
        _ => {
            return Err(FetchError::malformed(
                Resource::Jobs,
                "response.jobs is missing or not an array",
            ))
        }
    };

    let records = jobs
        .iter()
        .filter_map(Value::as_object)
        .cloned()
        .map(normalize_job)
        .collect();

    Ok(FetchedJobs {
        records,
        reported_total: envelope
            .meta
            .as_ref()
            .and_then(|meta| meta.get("count"))
            .and_then(Value::as_u64),
    })
}

/// Decode a `/jobs/{jobid}` body into the job record.
pub fn decode_job(body: &str, callback: &str) -> Result<Record, FetchError> {
    let envelope = parse_envelope(body, callback, Resource::Job)?;

    match envelope.response.and_then(|mut r| r.get_mut("job").map(Value::take)) {
        Some(Value::Object(job)) => Ok(normalize_job(job)),
        _ => Err(FetchError::malformed(
            Resource::Job,
            "response.job is missing or not an object",
        )),
    }
}
