//! Web-service endpoint templates and placeholder substitution.

/// Path prefix the dashboard pages live under.
pub const DEFAULT_ROOT: &str = "/pogo/";

/// Base URL of the job web service.
pub const DEFAULT_WS_ROOT: &str = "http://localhost:7657/v1";

pub const JOBS_WS: &str = "{root}/jobs?{params}&cb={callback}";
pub const JOB_WS: &str = "{root}/jobs/{jobid}?cb={callback}";
pub const JOB_LOG_WS: &str = "{root}/jobs/{jobid}/log?cb={callback}";
pub const JOB_HOSTS_WS: &str = "{root}/jobs/{jobid}/hosts?cb={callback}";
pub const JOB_HOST_WS: &str = "{root}/jobs/{jobid}/hosts/{hostname}?cb={callback}";

/// Fixed roots every template is filled with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    /// Page root, e.g. `/pogo/`. Always ends with `/`.
    pub root: String,
    /// Web-service root, e.g. `http://host:7657/v1`. Never ends with `/`.
    pub ws_root: String,
}

impl Default for Env {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT, DEFAULT_WS_ROOT)
    }
}

impl Env {
    pub fn new(root: impl Into<String>, ws_root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.ends_with('/') {
            root.push('/');
        }
        let ws_root = ws_root.into().trim_end_matches('/').to_string();
        Self { root, ws_root }
    }

    /// URL of the job log for `jobid`.
    pub fn job_log_url(&self, jobid: &str, callback: &str) -> String {
        sub(
            JOB_LOG_WS,
            &[("root", &self.ws_root), ("jobid", jobid), ("callback", callback)],
        )
    }

    /// URL listing the hosts of `jobid`.
    pub fn job_hosts_url(&self, jobid: &str, callback: &str) -> String {
        sub(
            JOB_HOSTS_WS,
            &[("root", &self.ws_root), ("jobid", jobid), ("callback", callback)],
        )
    }

    /// URL of a single host of `jobid`.
    pub fn job_host_url(&self, jobid: &str, hostname: &str, callback: &str) -> String {
        sub(
            JOB_HOST_WS,
            &[
                ("root", &self.ws_root),
                ("jobid", jobid),
                ("hostname", hostname),
                ("callback", callback),
            ],
        )
    }
}

/// Replace `{key}` placeholders in `template` with the matching value.
///
/// Placeholders without a matching key are left as they are.
pub fn sub(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        let key = &tail[1..close];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_fills_known_placeholders() {
        let url = sub(JOB_WS, &[("root", "http://ws/v1"), ("jobid", "p42"), ("callback", "cb1")]);
        assert_eq!(url, "http://ws/v1/jobs/p42?cb=cb1");
    }

    #[test]
    fn sub_keeps_unknown_placeholders() {
        assert_eq!(sub("{a}-{b}", &[("a", "1")]), "1-{b}");
        assert_eq!(sub("open {brace", &[]), "open {brace");
    }

    #[test]
    fn sub_repeats_values() {
        assert_eq!(sub("{x}/{x}", &[("x", "y")]), "y/y");
    }

    #[test]
    fn env_normalises_slashes() {
        let env = Env::new("/pogo", "http://ws:7657/v1/");
        assert_eq!(env.root, "/pogo/");
        assert_eq!(env.ws_root, "http://ws:7657/v1");
    }

    #[test]
    fn sibling_urls() {
        let env = Env::default();
        assert_eq!(
            env.job_host_url("p1", "web1", "cb"),
            "http://localhost:7657/v1/jobs/p1/hosts/web1?cb=cb"
        );
        assert_eq!(env.job_log_url("p1", "cb"), "http://localhost:7657/v1/jobs/p1/log?cb=cb");
        assert_eq!(env.job_hosts_url("p1", "cb"), "http://localhost:7657/v1/jobs/p1/hosts?cb=cb");
    }
}
