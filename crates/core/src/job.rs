//! Normalisation of raw job records.
//!
//! The web service is loose about types: `range` may arrive JSON-encoded
//! inside a string, and `finish_time` is only implied by the last log
//! entry. These helpers bring a record into the shape the views expect.

use serde_json::Value;

use crate::types::{number_field, Record};

/// Text fields every job carries, defaulting to `""`.
const TEXT_FIELDS: &[&str] = &[
    "jobid",
    "user",
    "run_as",
    "posthook",
    "timeout",
    "prehook",
    "requesthost",
    "invoked_as",
    "namespace",
    "client",
    "retry",
    "job_timeout",
    "state",
    "start_time",
    "finish_time",
    "command",
    "host_count",
    "job_status",
    "end_time",
];

/// Job states in which a job can still be halted.
pub const HALTABLE_STATES: &[&str] = &["ready", "waiting", "running", "gathering"];

/// Coerce a `range` value into a list of targets.
///
/// Arrays pass through. Strings are decoded as JSON and kept when they hold
/// an array. Everything else, including undecodable strings, is an empty
/// list.
pub fn normalize_range(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Derive `finish_time` and `duration` from the job log.
///
/// When `log` is a non-empty array the last entry's `time` becomes the
/// finish time. Records without a usable log are left untouched.
pub fn apply_log_timing(record: &mut Record) {
    let finish = match record.get("log") {
        Some(Value::Array(entries)) => entries
            .last()
            .and_then(Value::as_object)
            .and_then(|entry| number_field(entry, "time")),
        _ => None,
    };
    let Some(finish) = finish else {
        return;
    };

    record.insert("finish_time".into(), Value::from(finish));
    if let Some(start) = number_field(record, "start_time") {
        record.insert("duration".into(), Value::from(finish - start));
    }
}

/// Fill job defaults and apply the range and log-timing rules.
pub fn normalize_job(mut record: Record) -> Record {
    for key in TEXT_FIELDS {
        record
            .entry(*key)
            .or_insert_with(|| Value::String(String::new()));
    }
    record
        .entry("log")
        .or_insert_with(|| Value::Array(Vec::new()));
    record
        .entry("hosts")
        .or_insert_with(|| Value::Object(Record::new()));

    let range = record.get("range").map(normalize_range).unwrap_or_default();
    record.insert("range".into(), Value::Array(range));

    apply_log_timing(&mut record);
    record
}

/// Whether a job in `state` can still be halted.
pub fn is_haltable(state: &str) -> bool {
    HALTABLE_STATES.contains(&state)
}
