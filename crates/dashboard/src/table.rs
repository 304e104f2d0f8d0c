//! Binding of one paginated collection to one pager.
//!
//! [`TableBinding`] is the synchronous core of a dashboard table. It decides
//! when a new frame must be rendered:
//!
//! - a settled load updates the pager total, applies any queued page
//!   request, and renders;
//! - a page request renders immediately, unless a load is in flight, in
//!   which case the latest request is queued until that load settles.
//!
//! A superseded load never renders.

use pogo_client::source::FetchedJobs;
use pogo_core::error::FetchError;
use pogo_core::pager::Pager;
use pogo_core::types::{Query, Record};

use crate::collection::{LoadOutcome, LoadTicket, PaginatedCollection, TotalSource};

/// Message shown while a table is loading.
pub const LOADING_MESSAGE: &str = "Loading...";

/// Message shown for a table that loaded zero rows.
pub const EMPTY_MESSAGE: &str = "No data to display.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Loading,
    Ready,
    Empty,
    /// The last load failed; rows from the previous successful load remain.
    Error(String),
}

impl TableStatus {
    /// Status line for the table, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            TableStatus::Loading => Some(LOADING_MESSAGE.to_string()),
            TableStatus::Ready => None,
            TableStatus::Empty => Some(EMPTY_MESSAGE.to_string()),
            TableStatus::Error(msg) => Some(format!("Error when loading data: {msg}")),
        }
    }
}

/// Everything a renderer needs to draw one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFrame {
    pub rows: Vec<Record>,
    pub page: u32,
    pub page_count: u32,
    pub total_items: u64,
    pub status: TableStatus,
}

#[derive(Debug)]
pub struct TableBinding {
    collection: PaginatedCollection,
    pager: Pager,
    total_source: TotalSource,
    queued_page: Option<u32>,
    status: TableStatus,
}

impl TableBinding {
    pub fn new(page_size: u32, total_source: TotalSource) -> Self {
        Self {
            collection: PaginatedCollection::new(),
            pager: Pager::new(page_size),
            total_source,
            queued_page: None,
            status: TableStatus::Loading,
        }
    }

    /// Start on `page` once the first load settles.
    pub fn with_initial_page(mut self, page: u32) -> Self {
        self.queued_page = Some(page);
        self
    }

    pub fn collection(&self) -> &PaginatedCollection {
        &self.collection
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn status(&self) -> &TableStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.collection.is_loading()
    }

    /// Issue a load for `query`. The caller performs the fetch and passes
    /// the result to [`settle`](Self::settle) with the returned ticket.
    pub fn request_load(&mut self, query: Query) -> LoadTicket {
        self.status = TableStatus::Loading;
        self.collection.begin_load(query)
    }

    /// Ask for page `n`. Returns the frame to render, or `None` when
    /// nothing visible changed or the request was queued behind a load.
    pub fn request_page(&mut self, n: u32) -> Option<TableFrame> {
        if self.collection.is_loading() {
            tracing::debug!(page = n, "Queueing page change behind in-flight load");
            self.queued_page = Some(n);
            return None;
        }
        self.pager.set_page(n).map(|_| self.frame())
    }

    /// Apply a finished fetch. Returns the frame to render, or `None` if
    /// the fetch had been superseded.
    pub fn settle(
        &mut self,
        ticket: LoadTicket,
        result: Result<FetchedJobs, FetchError>,
    ) -> Option<TableFrame> {
        match self.collection.complete_load(ticket, result) {
            LoadOutcome::Superseded => return None,
            LoadOutcome::Loaded { count } => {
                self.status = if count == 0 {
                    TableStatus::Empty
                } else {
                    TableStatus::Ready
                };
            }
            LoadOutcome::Failed(e) => {
                self.status = TableStatus::Error(e.to_string());
            }
        }

        self.pager
            .set_total_items(self.collection.total_items(self.total_source));
        if let Some(page) = self.queued_page.take() {
            self.pager.set_page(page);
        }
        Some(self.frame())
    }

    /// The current visible state.
    pub fn frame(&self) -> TableFrame {
        TableFrame {
            rows: self
                .collection
                .window(self.pager.page(), self.pager.page_size())
                .to_vec(),
            page: self.pager.page(),
            page_count: self.pager.page_count(),
            total_items: self.pager.total_items(),
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pogo_core::error::Resource;
    use serde_json::json;

    use super::*;

    fn alice_jobs(n: usize) -> FetchedJobs {
        FetchedJobs {
            records: (0..n)
                .map(|i| json!({"jobid": format!("p{i}"), "user": "alice"}))
                .map(|v| v.as_object().cloned().unwrap())
                .collect(),
            reported_total: None,
        }
    }

    fn loaded(n: usize) -> TableBinding {
        let mut binding = TableBinding::new(25, TotalSource::RecordCount);
        let ticket = binding.request_load(Query::new().with("user", "alice").with_pagination(25, 1));
        binding.settle(ticket, Ok(alice_jobs(n)));
        binding
    }

    #[test]
    fn paging_through_sixty_records() {
        let mut binding = loaded(60);

        let frame = binding.frame();
        assert_eq!(frame.rows.len(), 25);
        assert_eq!(frame.page_count, 3);
        assert!(frame.rows.iter().all(|r| r["user"] == json!("alice")));

        let frame = binding.request_page(3).unwrap();
        assert_eq!(frame.rows.len(), 10);
        assert_eq!(frame.page, 3);

        // Already on the last page: clamped, nothing to re-render.
        assert_eq!(binding.request_page(4), None);
        assert_eq!(binding.pager().page(), 3);
    }

    #[test]
    fn page_request_during_load_is_queued() {
        let mut binding = loaded(60);
        let ticket = binding.request_load(Query::new());

        assert_eq!(binding.request_page(2), None);
        assert_eq!(binding.request_page(3), None);
        assert_eq!(binding.pager().page(), 1);

        let frame = binding.settle(ticket, Ok(alice_jobs(60))).unwrap();
        assert_eq!(frame.page, 3);
        assert_eq!(frame.rows.len(), 10);
    }

    #[test]
    fn initial_page_applies_after_first_load() {
        let mut binding = TableBinding::new(10, TotalSource::RecordCount).with_initial_page(2);
        let ticket = binding.request_load(Query::new());
        let frame = binding.settle(ticket, Ok(alice_jobs(15))).unwrap();
        assert_eq!(frame.page, 2);
        assert_eq!(frame.rows.len(), 5);
    }

    #[test]
    fn failed_load_keeps_prior_window_with_error() {
        let mut binding = loaded(60);
        binding.request_page(2);
        let before = binding.frame().rows;

        let ticket = binding.request_load(Query::new());
        let frame = binding
            .settle(ticket, Err(FetchError::malformed(Resource::Jobs, "no jobs")))
            .unwrap();

        assert_eq!(frame.rows, before);
        assert_eq!(frame.status, TableStatus::Error("Could not load jobs".into()));
        assert_eq!(
            frame.status.message().as_deref(),
            Some("Error when loading data: Could not load jobs")
        );
    }

    #[test]
    fn first_load_failure_shows_empty_window() {
        let mut binding = TableBinding::new(25, TotalSource::RecordCount);
        let ticket = binding.request_load(Query::new());
        let frame = binding
            .settle(ticket, Err(FetchError::timeout(Resource::Jobs)))
            .unwrap();
        assert!(frame.rows.is_empty());
        assert_eq!(frame.page, 1);
        assert_eq!(frame.page_count, 1);
    }

    #[test]
    fn superseded_load_does_not_render() {
        let mut binding = TableBinding::new(25, TotalSource::RecordCount);
        let first = binding.request_load(Query::new().with("user", "alice"));
        let second = binding.request_load(Query::new().with("user", "bob"));

        assert!(binding.settle(second, Ok(alice_jobs(3))).is_some());
        assert!(binding.settle(first, Ok(alice_jobs(50))).is_none());
        assert_eq!(binding.frame().rows.len(), 3);
    }

    #[test]
    fn shrinking_result_clamps_page() {
        let mut binding = loaded(60);
        binding.request_page(3);

        let ticket = binding.request_load(Query::new());
        let frame = binding.settle(ticket, Ok(alice_jobs(30))).unwrap();
        assert_eq!(frame.page, 2);
        assert_eq!(frame.rows.len(), 5);
    }

    #[test]
    fn empty_result_has_empty_status() {
        let frame = loaded(0).frame();
        assert_eq!(frame.status, TableStatus::Empty);
        assert_eq!(frame.page, 1);
    }
}
