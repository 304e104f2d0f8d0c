//! Paginated job collection with stale-response protection.
//!
//! Every load is tagged with a generation number. Only the result of the
//! most recently issued load may replace the collection's records; results
//! of superseded loads are discarded whenever they arrive.

use pogo_client::source::{FetchedJobs, JobSource};
use pogo_core::error::FetchError;
use pogo_core::pager::window;
use pogo_core::types::{Query, Record};

/// Where a table's total item count comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSource {
    /// The server's `meta.count`, falling back to the number of records
    /// held when the server does not report one.
    Reported,
    /// The number of records held.
    RecordCount,
}

/// Receipt for one issued load. Hand it back to
/// [`PaginatedCollection::complete_load`] together with the fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    query: Query,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

/// What completing a load did to the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Records and total were replaced.
    Loaded { count: usize },
    /// The fetch failed; previous records are kept.
    Failed(FetchError),
    /// A newer load was issued after this one; the result was discarded.
    Superseded,
}

#[derive(Debug, Default)]
pub struct PaginatedCollection {
    records: Vec<Record>,
    /// Query that produced `records`.
    query: Option<Query>,
    reported_total: Option<u64>,
    /// Generation of the most recently issued load.
    generation: u64,
    in_flight: bool,
    last_error: Option<FetchError>,
}

impl PaginatedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new load for `query`, superseding any load still in flight.
    pub fn begin_load(&mut self, query: Query) -> LoadTicket {
        self.generation += 1;
        self.in_flight = true;
        tracing::debug!(generation = self.generation, "Collection load issued");
        LoadTicket {
            generation: self.generation,
            query,
        }
    }

    /// Apply the result of the load identified by `ticket`.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FetchedJobs, FetchError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "Discarding superseded load",
            );
            return LoadOutcome::Superseded;
        }
        self.in_flight = false;

        match result {
            Ok(fetched) => {
                let count = fetched.records.len();
                self.records = fetched.records;
                self.reported_total = fetched.reported_total;
                self.query = Some(ticket.query);
                self.last_error = None;
                LoadOutcome::Loaded { count }
            }
            Err(e) => {
                tracing::warn!(
                    generation = ticket.generation,
                    cause = %e.cause,
                    kept = self.records.len(),
                    "Collection load failed: {e}",
                );
                self.last_error = Some(e.clone());
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Issue a load for `query`, await `source`, and apply the result.
    pub async fn load(&mut self, source: &dyn JobSource, query: Query) -> LoadOutcome {
        let ticket = self.begin_load(query);
        let result = source.fetch_jobs(ticket.query()).await;
        self.complete_load(ticket, result)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn total_items(&self, source: TotalSource) -> u64 {
        let held = self.records.len() as u64;
        match source {
            TotalSource::Reported => self.reported_total.unwrap_or(held),
            TotalSource::RecordCount => held,
        }
    }

    /// Records visible on `page` of `page_size` rows.
    pub fn window(&self, page: u32, page_size: u32) -> &[Record] {
        window(&self.records, page, page_size)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pogo_core::error::Resource;
    use serde_json::json;

    use super::*;

    fn jobs(user: &str, n: usize) -> FetchedJobs {
        FetchedJobs {
            records: (0..n)
                .map(|i| json!({"jobid": format!("p{i}"), "user": user}))
                .map(|v| v.as_object().cloned().unwrap())
                .collect(),
            reported_total: None,
        }
    }

    #[test]
    fn completed_load_replaces_records() {
        let mut collection = PaginatedCollection::new();
        let ticket = collection.begin_load(Query::new().with("user", "alice"));
        assert!(collection.is_loading());

        let outcome = collection.complete_load(ticket, Ok(jobs("alice", 3)));
        assert_eq!(outcome, LoadOutcome::Loaded { count: 3 });
        assert!(!collection.is_loading());
        assert_eq!(collection.records().len(), 3);
        assert_eq!(collection.query().and_then(|q| q.get("user")), Some("alice"));
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut collection = PaginatedCollection::new();
        let first = collection.begin_load(Query::new().with("user", "alice"));
        let second = collection.begin_load(Query::new().with("user", "bob"));

        assert_matches!(
            collection.complete_load(second, Ok(jobs("bob", 2))),
            LoadOutcome::Loaded { count: 2 }
        );
        assert_eq!(
            collection.complete_load(first, Ok(jobs("alice", 5))),
            LoadOutcome::Superseded
        );

        assert_eq!(collection.records().len(), 2);
        assert!(collection.records().iter().all(|r| r["user"] == json!("bob")));
        assert_eq!(collection.query().and_then(|q| q.get("user")), Some("bob"));
    }

    #[test]
    fn stale_result_does_not_end_newer_load() {
        let mut collection = PaginatedCollection::new();
        let first = collection.begin_load(Query::new());
        let _second = collection.begin_load(Query::new());

        collection.complete_load(first, Ok(jobs("a", 1)));
        assert!(collection.is_loading());
        assert!(collection.records().is_empty());
    }

    #[test]
    fn failure_keeps_previous_records() {
        let mut collection = PaginatedCollection::new();
        let ticket = collection.begin_load(Query::new());
        collection.complete_load(ticket, Ok(jobs("alice", 4)));

        let ticket = collection.begin_load(Query::new().with("user", "bob"));
        let err = FetchError::malformed(Resource::Jobs, "response.jobs missing");
        let outcome = collection.complete_load(ticket, Err(err.clone()));

        assert_eq!(outcome, LoadOutcome::Failed(err.clone()));
        assert_eq!(collection.records().len(), 4);
        assert_eq!(collection.last_error(), Some(&err));
        assert_eq!(collection.query(), Some(&Query::new()));
    }

    #[test]
    fn total_source_is_explicit() {
        let mut collection = PaginatedCollection::new();
        let ticket = collection.begin_load(Query::new());
        let mut fetched = jobs("alice", 10);
        fetched.reported_total = Some(250);
        collection.complete_load(ticket, Ok(fetched));

        assert_eq!(collection.total_items(TotalSource::Reported), 250);
        assert_eq!(collection.total_items(TotalSource::RecordCount), 10);
    }

    #[test]
    fn reported_total_falls_back_to_held_records() {
        let mut collection = PaginatedCollection::new();
        let ticket = collection.begin_load(Query::new());
        collection.complete_load(ticket, Ok(jobs("alice", 7)));
        assert_eq!(collection.total_items(TotalSource::Reported), 7);
    }

    #[test]
    fn window_slices_records() {
        let mut collection = PaginatedCollection::new();
        let ticket = collection.begin_load(Query::new());
        collection.complete_load(ticket, Ok(jobs("alice", 60)));

        assert_eq!(collection.window(1, 25).len(), 25);
        assert_eq!(collection.window(3, 25).len(), 10);
        assert_eq!(collection.window(3, 25)[0]["jobid"], json!("p50"));
        assert!(collection.window(4, 25).is_empty());
    }
}
