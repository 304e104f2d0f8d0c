use std::str::FromStr;
use std::time::Duration;

use pogo_core::env::{Env, DEFAULT_ROOT, DEFAULT_WS_ROOT};

use crate::error::DashboardError;
use crate::views::multi_table::DEFAULT_LIMIT;

/// Default job service request timeout in milliseconds.
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2000;

/// Dashboard configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local Pogo service.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Page root and web-service root.
    pub env: Env,
    /// Rows per table page, also sent as `max` (default: `25`).
    pub page_size: u32,
    /// Per-request timeout of the job service client (default: 2s).
    pub fetch_timeout: Duration,
    /// Interval between table refreshes; `None` loads once.
    pub refresh: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            env: Env::default(),
            page_size: DEFAULT_LIMIT,
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            refresh: None,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `POGO_WS_ROOT`          | `http://localhost:7657/v1` |
    /// | `POGO_ROOT`             | `/pogo/`                   |
    /// | `POGO_PAGE_SIZE`        | `25`                       |
    /// | `POGO_FETCH_TIMEOUT_MS` | `2000`                     |
    /// | `POGO_REFRESH_SECS`     | `0` (no refresh)           |
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// As [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DashboardError> {
        let ws_root = lookup("POGO_WS_ROOT").unwrap_or_else(|| DEFAULT_WS_ROOT.into());
        let root = lookup("POGO_ROOT").unwrap_or_else(|| DEFAULT_ROOT.into());

        let page_size: u32 = parse_var(&lookup, "POGO_PAGE_SIZE", DEFAULT_LIMIT)?;
        if page_size == 0 {
            return Err(DashboardError::Config(
                "POGO_PAGE_SIZE must be at least 1".into(),
            ));
        }

        let timeout_ms: u64 = parse_var(&lookup, "POGO_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS)?;
        let refresh_secs: u64 = parse_var(&lookup, "POGO_REFRESH_SECS", 0)?;

        Ok(Self {
            env: Env::new(root, ws_root),
            page_size,
            fetch_timeout: Duration::from_millis(timeout_ms),
            refresh: refresh_interval(refresh_secs),
        })
    }
}

/// `0` disables refreshing.
pub fn refresh_interval(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, DashboardError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            DashboardError::Config(format!("{key} must be a non-negative integer, got {raw:?}"))
        }),
    }
}
