//! Page routes of the dashboard and their titles.

/// A dashboard page, parsed from a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    User { name: String },
    Job { jobid: String },
    Host { jobid: String, hostname: String },
    /// Any other path; displayed as the home page.
    Unknown { path: String },
}

impl Route {
    /// Match `path` against the routes under `root` (which ends with `/`).
    pub fn parse(root: &str, path: &str) -> Self {
        let unknown = || Route::Unknown {
            path: path.to_string(),
        };

        let Some(rest) = path.strip_prefix(root).or_else(|| {
            // `/pogo` matches a root of `/pogo/`.
            (path == root.trim_end_matches('/')).then_some("")
        }) else {
            return unknown();
        };

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["user", name] => Route::User {
                name: (*name).to_string(),
            },
            ["job", jobid] => Route::Job {
                jobid: (*jobid).to_string(),
            },
            ["job", jobid, hostname] => Route::Host {
                jobid: (*jobid).to_string(),
                hostname: (*hostname).to_string(),
            },
            _ => unknown(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Route::Home => "Pogo - Home".to_string(),
            Route::User { name } => format!("Pogo - {name}'s Jobs"),
            Route::Job { jobid } => format!("Pogo - Job {jobid}"),
            Route::Host { jobid, hostname } => format!("Pogo - Job {jobid} Host: {hostname}"),
            Route::Unknown { path } => format!("Pogo - Unknown request: {path}"),
        }
    }
}
