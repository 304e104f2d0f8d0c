use std::fmt;

use serde_json::Value;

/// One fetched entity (a job, or a host within a job) as a field-keyed map.
///
/// Field order follows the server response.
pub type Record = serde_json::Map<String, Value>;

/// Server timestamps are seconds since the Unix epoch, possibly fractional.
pub type EpochSecs = f64;

/// Query-string key for the page size.
pub const PARAM_MAX: &str = "max";

/// Query-string key for the 0-based record offset.
pub const PARAM_OFFSET: &str = "offset";

/// Read a numeric field, accepting both JSON numbers and numeric strings.
pub fn number_field(record: &Record, key: &str) -> Option<f64> {
    match record.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a field as display text. Missing and `null` values become `""`.
pub fn text_field(record: &Record, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Filter and pagination parameters for one `/jobs` request.
///
/// Keys keep insertion order; setting an existing key replaces its value
/// in place. A `Query` is never mutated after it has been handed to a
/// fetch: the builder methods consume and return a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.set(key.into(), value.to_string());
        self
    }

    /// Copy every parameter of `other` into this query. `other` wins on
    /// conflicting keys.
    pub fn merge(mut self, other: &Query) -> Self {
        for (key, value) in &other.params {
            self.set(key.clone(), value.clone());
        }
        self
    }

    /// Add pagination for a 1-based `page` of `limit` records.
    ///
    /// `max` is always set; `offset` only when it is non-zero.
    pub fn with_pagination(mut self, limit: u32, page: u32) -> Self {
        let offset = u64::from(page.max(1) - 1) * u64::from(limit);
        self.set(PARAM_MAX.to_string(), limit.to_string());
        if offset > 0 {
            self.set(PARAM_OFFSET.to_string(), offset.to_string());
        } else {
            self.params.retain(|(k, _)| k != PARAM_OFFSET);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Page size requested through `max`, if any.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn set(&mut self, key: String, value: String) {
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }
}
