//! Job and host detail pages.
//!
//! [`JobDetail`] holds one loaded job and its derived host rows. The host
//! rows are recomputed every time the job record is loaded or replaced, so
//! they always reflect the job's current timing.

use pogo_client::source::JobSource;
use pogo_core::error::FetchError;
use pogo_core::format::{
    duration_cell, format_time, host_link, host_start_offset, timeline, Timeline,
};
use pogo_core::hosts::{derive_hosts_at, host_log_url, now_secs};
use pogo_core::job::{is_haltable, normalize_job};
use pogo_core::types::{number_field, text_field, EpochSecs, Record};

/// Column labels of the job hosts table.
pub const HOST_COLUMNS: &[&str] = &["Host", "State", "Time Started", "Duration", "Timeline"];

/// A loaded job plus its derived host rows.
#[derive(Debug, Clone, Default)]
pub struct JobDetail {
    job: Option<Record>,
    hosts: Vec<Record>,
}

impl JobDetail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch `jobid` and replace the held job on success. On failure the
    /// previously held job (if any) is kept.
    pub async fn load(&mut self, source: &dyn JobSource, jobid: &str) -> Result<(), FetchError> {
        let job = source.fetch_job(jobid).await?;
        self.set_job(job);
        Ok(())
    }

    /// Replace the held job and re-derive its host rows.
    pub fn set_job(&mut self, job: Record) {
        self.set_job_at(job, now_secs());
    }

    /// As [`set_job`](Self::set_job), with `now` as the finish time of an
    /// unfinished job.
    pub fn set_job_at(&mut self, job: Record, now: EpochSecs) {
        let job = normalize_job(job);
        self.hosts = derive_hosts_at(&job, now);
        tracing::debug!(
            jobid = %text_field(&job, "jobid"),
            hosts = self.hosts.len(),
            "Job hosts derived",
        );
        self.job = Some(job);
    }

    pub fn job(&self) -> Option<&Record> {
        self.job.as_ref()
    }

    pub fn hosts(&self) -> &[Record] {
        &self.hosts
    }
}

/// Job metadata block shared by the job and host pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMetadata {
    pub jobid: String,
    pub user: String,
    pub command: String,
    pub invoked_as: String,
    pub requesthost: String,
    pub retry: String,
    pub timeout: String,
    pub start_time: String,
    pub finish_time: String,
    pub state: String,
    /// Whether the job can still be halted.
    pub haltable: bool,
}

impl JobMetadata {
    pub fn from_job(job: &Record) -> Self {
        let time = |key| number_field(job, key).map(format_time).unwrap_or_default();
        let state = text_field(job, "state");
        Self {
            jobid: text_field(job, "jobid"),
            user: text_field(job, "user"),
            command: text_field(job, "command"),
            invoked_as: text_field(job, "invoked_as"),
            requesthost: text_field(job, "requesthost"),
            retry: text_field(job, "retry"),
            timeout: text_field(job, "timeout"),
            start_time: time("start_time"),
            finish_time: time("finish_time"),
            haltable: is_haltable(&state),
            state,
        }
    }

    /// Label/value pairs in display order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Command", self.command.as_str()),
            ("Invoked As", self.invoked_as.as_str()),
            ("Request Host", self.requesthost.as_str()),
            ("Retry", self.retry.as_str()),
            ("Timeout", self.timeout.as_str()),
            ("Start Time", self.start_time.as_str()),
            ("End Time", self.finish_time.as_str()),
            ("State", self.state.as_str()),
        ]
    }
}

/// The job page: metadata plus the hosts table.
#[derive(Debug, Clone, PartialEq)]
pub struct JobView {
    pub header: String,
    pub metadata: JobMetadata,
    pub hosts_header: String,
    pub hosts: Vec<Record>,
}

impl JobView {
    pub fn new(detail: &JobDetail) -> Option<Self> {
        let job = detail.job()?;
        let metadata = JobMetadata::from_job(job);
        Some(Self {
            header: format!("{} for {}", metadata.jobid, metadata.user),
            hosts_header: format!("{}'s Hosts", metadata.jobid),
            metadata,
            hosts: detail.hosts().to_vec(),
        })
    }
}

/// The host page: job metadata plus the host's log location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostView {
    pub header: String,
    pub metadata: JobMetadata,
    pub hostname: String,
    pub log_url: String,
}

impl HostView {
    pub fn new(detail: &JobDetail, hostname: &str) -> Option<Self> {
        let job = detail.job()?;
        let metadata = JobMetadata::from_job(job);
        Some(Self {
            header: format!("{hostname} for {} via {}", metadata.user, metadata.jobid),
            hostname: hostname.to_string(),
            log_url: host_log_url(job, hostname),
            metadata,
        })
    }
}

/// Format one derived host row.
pub fn host_cells(row: &Record, root: &str) -> Vec<String> {
    let start = number_field(row, "start_time");
    let job_start = number_field(row, "job_start");
    let duration = number_field(row, "duration");

    let started = match (start, job_start) {
        (Some(start), Some(job_start)) => {
            format!("{} {}", format_time(start), host_start_offset(start, job_start))
        }
        (Some(start), None) => format_time(start),
        _ => String::new(),
    };

    let bar = match (duration, start, job_start, number_field(row, "job_duration")) {
        (Some(d), Some(s), Some(js), Some(jd)) => render_timeline(timeline(d, s, js, jd)),
        _ => String::new(),
    };

    vec![
        host_link(root, &text_field(row, "jobid"), &text_field(row, "host")),
        text_field(row, "state"),
        started,
        duration.map(duration_cell).unwrap_or_default(),
        bar,
    ]
}

fn render_timeline(t: Timeline) -> String {
    format!("+{}% / {}%", t.start_pct, t.duration_pct)
}
