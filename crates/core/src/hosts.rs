//! Host rows derived from a job record.
//!
//! A job embeds its hosts as a map keyed by hostname. Each host row shown
//! in the job view is that entry stamped with the owning job's id and
//! timing, so the row can be formatted without looking at the job again.

use chrono::Utc;
use serde_json::Value;

use crate::types::{number_field, EpochSecs, Record};

/// Log URL shown when a host has no log of its own.
pub const BLANK_LOG_URL: &str = "about:blank";

/// Derive host rows using the current wall-clock time for unfinished jobs.
pub fn derive_hosts(job: &Record) -> Vec<Record> {
    derive_hosts_at(job, now_secs())
}

/// Derive host rows for `job`, using `now` as the finish time of a job that
/// has not finished yet.
///
/// Rows follow the order of the job's `hosts` map. Entries that are not
/// objects are skipped.
pub fn derive_hosts_at(job: &Record, now: EpochSecs) -> Vec<Record> {
    let Some(Value::Object(hosts)) = job.get("hosts") else {
        return Vec::new();
    };

    let jobid = job.get("jobid").cloned().unwrap_or(Value::Null);
    let job_start = number_field(job, "start_time");
    let job_finish = number_field(job, "finish_time").unwrap_or(now);
    let job_duration = number_field(job, "duration")
        .or_else(|| job_start.map(|start| job_finish - start));

    hosts
        .iter()
        .filter_map(|(hostname, entry)| {
            let mut row = entry.as_object()?.clone();

            let duration = match (number_field(&row, "start_time"), number_field(&row, "finish_time")) {
                (Some(start), Some(finish)) => Value::from(finish - start),
                _ => Value::Null,
            };

            row.insert("jobid".into(), jobid.clone());
            row.insert("host".into(), Value::String(hostname.clone()));
            row.insert("duration".into(), duration);
            row.insert("job_start".into(), optional_number(job_start));
            row.insert("job_finish".into(), Value::from(job_finish));
            row.insert("job_duration".into(), optional_number(job_duration));
            Some(row)
        })
        .collect()
}

/// The log URL for `hostname` within `job`, or [`BLANK_LOG_URL`].
pub fn host_log_url(job: &Record, hostname: &str) -> String {
    job.get("hosts")
        .and_then(|hosts| hosts.get(hostname))
        .and_then(|host| host.get("log"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .unwrap_or(BLANK_LOG_URL)
        .to_string()
}

fn optional_number(value: Option<f64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

/// The current time in epoch seconds.
pub fn now_secs() -> EpochSecs {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn job(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn finished_job() -> Record {
        job(json!({
            "jobid": "p0000000042",
            "start_time": 10,
            "finish_time": 200,
            "duration": 190,
            "hosts": {
                "web1.example.com": {"state": "finished", "start_time": 40, "finish_time": 100, "log": "http://logs/web1"},
                "web2.example.com": {"state": "failed", "start_time": 50, "finish_time": 55},
            }
        }))
    }

    #[test]
    fn rows_carry_job_fields_and_duration() {
        let rows = derive_hosts_at(&finished_job(), 1_000.0);
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first["host"], json!("web1.example.com"));
        assert_eq!(first["jobid"], json!("p0000000042"));
        assert_eq!(number_field(first, "duration"), Some(60.0));
        assert_eq!(number_field(first, "job_start"), Some(10.0));
        assert_eq!(number_field(first, "job_finish"), Some(200.0));
        assert_eq!(number_field(first, "job_duration"), Some(190.0));
        assert_eq!(first["state"], json!("finished"));
    }

    #[test]
    fn rows_keep_host_map_order() {
        let rows = derive_hosts_at(&finished_job(), 0.0);
        let names: Vec<_> = rows.iter().map(|r| r["host"].clone()).collect();
        assert_eq!(names, vec![json!("web1.example.com"), json!("web2.example.com")]);
    }

    #[test]
    fn derivation_is_repeatable() {
        let parent = finished_job();
        assert_eq!(derive_hosts(&parent), derive_hosts(&parent));
    }

    #[test]
    fn unfinished_job_uses_now() {
        let parent = job(json!({
            "jobid": "p1",
            "start_time": 100,
            "finish_time": "",
            "hosts": {"h1": {"start_time": 110}},
        }));
        let rows = derive_hosts_at(&parent, 500.0);
        assert_eq!(number_field(&rows[0], "job_finish"), Some(500.0));
        assert_eq!(number_field(&rows[0], "job_duration"), Some(400.0));
        assert_eq!(rows[0]["duration"], Value::Null);
    }

    #[test]
    fn unfinished_job_uses_wall_clock() {
        let parent = job(json!({"jobid": "p1", "start_time": 1, "hosts": {"h1": {}}}));
        let before = now_secs();
        let rows = derive_hosts(&parent);
        let finish = number_field(&rows[0], "job_finish").unwrap();
        assert!(finish >= before.floor());
    }

    #[test]
    fn job_without_hosts_has_no_rows() {
        assert!(derive_hosts_at(&job(json!({"jobid": "p1"})), 0.0).is_empty());
        assert!(derive_hosts_at(&job(json!({"jobid": "p1", "hosts": []})), 0.0).is_empty());
    }

    #[test]
    fn non_object_host_entries_are_skipped() {
        let parent = job(json!({"jobid": "p1", "hosts": {"h1": "bogus", "h2": {}}}));
        let rows = derive_hosts_at(&parent, 0.0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["host"], json!("h2"));
    }

    #[test]
    fn log_url_falls_back_to_blank() {
        let parent = finished_job();
        assert_eq!(host_log_url(&parent, "web1.example.com"), "http://logs/web1");
        assert_eq!(host_log_url(&parent, "web2.example.com"), BLANK_LOG_URL);
        assert_eq!(host_log_url(&parent, "nope"), BLANK_LOG_URL);
    }
}
