//! Cell formatters for job and host tables.
//!
//! Every formatter returns a ready-to-insert HTML fragment or plain text.
//! User-controlled text is escaped before it is embedded.

use chrono::DateTime;
use serde_json::Value;

use crate::env::sub;

/// Default length used by [`truncate_text`].
pub const DEFAULT_TRUNCATE_LEN: usize = 20;

/// Format an epoch timestamp as `MM/DD/YY HH:MM:SS` (UTC).
///
/// Values outside chrono's range render as an empty string.
pub fn format_time(epoch_secs: f64) -> String {
    let millis = (epoch_secs * 1000.0).round() as i64;
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%x %X").to_string())
        .unwrap_or_default()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            other => out.push(other),
        }
    }
    out
}

/// Cut `text` to `len` characters plus `...` and HTML-escape the result.
///
/// Text is cut as soon as it is longer than `len - 3` characters, so a
/// string of exactly `len` characters still gets the ellipsis.
pub fn truncate_text(text: &str, len: usize) -> String {
    if text.chars().count() > len.saturating_sub(3) {
        let cut: String = text.chars().take(len).collect();
        escape_html(&format!("{cut}..."))
    } else {
        escape_html(text)
    }
}

pub fn job_link(root: &str, jobid: &str) -> String {
    sub(
        r#"<a href="{root}job/{id}">{id}</a>"#,
        &[("root", root), ("id", &escape_html(jobid))],
    )
}

pub fn user_link(root: &str, user: &str) -> String {
    sub(
        r#"<a href="{root}user/{username}">{username}</a>"#,
        &[("root", root), ("username", &escape_html(user))],
    )
}

pub fn host_link(root: &str, jobid: &str, hostname: &str) -> String {
    sub(
        r#"<a href="{root}job/{jobid}/{hostname}">{hostname}</a>"#,
        &[
            ("root", root),
            ("jobid", &escape_html(jobid)),
            ("hostname", &escape_html(hostname)),
        ],
    )
}

/// Command cell: truncated text with the full command as a tooltip.
pub fn command_cell(command: &str) -> String {
    sub(
        r#"<span title="{command}">{command_trunc}</span>"#,
        &[
            ("command", &escape_html(command)),
            ("command_trunc", &truncate_text(command, DEFAULT_TRUNCATE_LEN)),
        ],
    )
}

/// Targets cell: the comma-joined range, truncated, with a tooltip.
pub fn targets_cell(range: &[Value]) -> String {
    let targets = range
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    sub(
        r#"<span title="{targets}">{targets_trunc}</span>"#,
        &[
            ("targets", &escape_html(&targets)),
            ("targets_trunc", &truncate_text(&targets, DEFAULT_TRUNCATE_LEN)),
        ],
    )
}

/// Host start relative to the job start, e.g. `(+12s)`.
pub fn host_start_offset(start: f64, job_start: f64) -> String {
    format!("(+{}s)", (start - job_start).floor())
}

pub fn duration_cell(secs: f64) -> String {
    format!("{secs}s")
}

/// Position of a host's run within the job's timeline, as floored
/// percentages of the job duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub start_pct: i64,
    pub duration_pct: i64,
}

pub fn timeline(duration: f64, start: f64, job_start: f64, job_duration: f64) -> Timeline {
    if job_duration <= 0.0 || !job_duration.is_finite() {
        return Timeline {
            start_pct: 0,
            duration_pct: 0,
        };
    }
    Timeline {
        start_pct: ((start - job_start) / job_duration * 100.0).floor() as i64,
        duration_pct: (duration / job_duration * 100.0).floor() as i64,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn time_is_formatted_in_utc() {
        assert_eq!(format_time(0.0), "01/01/70 00:00:00");
        assert_eq!(format_time(1_330_000_000.0), "02/23/12 12:26:40");
    }

    #[test]
    fn short_text_is_only_escaped() {
        assert_eq!(truncate_text("ls -l", 20), "ls -l");
        assert_eq!(truncate_text("a<b", 20), "a&lt;b");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let text = "uptime && sudo apachectl restart";
        assert_eq!(truncate_text(text, 20), "uptime &amp;&amp; sudo apach...");
    }

    #[test]
    fn text_near_limit_is_cut() {
        // 18 chars > 20 - 3, so the ellipsis is added even though nothing is removed.
        assert_eq!(truncate_text("abcdefghijklmnopqr", 20), "abcdefghijklmnopqr...");
        assert_eq!(truncate_text("abcdefghijklmnopq", 20), "abcdefghijklmnopq");
    }

    #[test]
    fn links_point_under_root() {
        assert_eq!(job_link("/pogo/", "p42"), r#"<a href="/pogo/job/p42">p42</a>"#);
        assert_eq!(user_link("/pogo/", "alice"), r#"<a href="/pogo/user/alice">alice</a>"#);
        assert_eq!(
            host_link("/pogo/", "p42", "web1"),
            r#"<a href="/pogo/job/p42/web1">web1</a>"#
        );
    }

    #[test]
    fn targets_are_joined() {
        let cell = targets_cell(&[json!("a"), json!("b")]);
        assert_eq!(cell, r#"<span title="a, b">a, b</span>"#);
    }

    #[test]
    fn command_cell_escapes_tooltip() {
        let cell = command_cell("echo \"hi\"");
        assert_eq!(cell, r#"<span title="echo &quot;hi&quot;">echo &quot;hi&quot;</span>"#);
    }

    #[test]
    fn host_offsets_and_durations() {
        assert_eq!(host_start_offset(52.7, 40.0), "(+12s)");
        assert_eq!(duration_cell(60.0), "60s");
    }

    #[test]
    fn timeline_percentages() {
        let t = timeline(60.0, 40.0, 0.0, 200.0);
        assert_eq!(t, Timeline { start_pct: 20, duration_pct: 30 });

        let zero = timeline(60.0, 40.0, 0.0, 0.0);
        assert_eq!(zero, Timeline { start_pct: 0, duration_pct: 0 });
    }
}
