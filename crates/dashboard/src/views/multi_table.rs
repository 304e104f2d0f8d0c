//! Tabbed job tables: the home dashboard and per-user pages.
//!
//! A [`MultiTableView`] describes a page made of several job tables that
//! share columns and pagination but differ in their filter parameters.

use pogo_core::format::{command_cell, format_time, job_link, targets_cell, user_link};
use pogo_core::job::normalize_range;
use pogo_core::types::{number_field, text_field, Query, Record};

/// Default number of rows per page.
pub const DEFAULT_LIMIT: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

/// Columns of the home dashboard tables.
pub const JOB_COLUMNS: &[Column] = &[
    Column { key: "jobid", label: "Pogo ID" },
    Column { key: "user", label: "User" },
    Column { key: "state", label: "State" },
    Column { key: "start_time", label: "Start Time" },
    Column { key: "command", label: "Command" },
    Column { key: "range", label: "Targets" },
    Column { key: "host_count", label: "Hosts" },
];

/// One table (tab) of a multi-table page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub label: String,
    pub params: Query,
}

impl TableSpec {
    pub fn new(label: impl Into<String>, params: Query) -> Self {
        Self {
            label: label.into(),
            params,
        }
    }
}

/// The "Active" and "All" tables.
pub fn default_tables() -> Vec<TableSpec> {
    vec![
        TableSpec::new("Active", Query::new().with("active", 1)),
        TableSpec::new("All", Query::new()),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiTableView {
    pub title: String,
    pub columns: Vec<Column>,
    pub tables: Vec<TableSpec>,
    /// Parameters added to every table's query.
    pub extra_params: Query,
    /// Rows per page, also sent as `max`.
    pub limit: u32,
    /// Page shown once each table has loaded (1-based).
    pub page: u32,
}

impl MultiTableView {
    /// The home dashboard.
    pub fn dashboard(limit: u32) -> Self {
        Self {
            title: "Pogo Jobs".to_string(),
            columns: JOB_COLUMNS.to_vec(),
            tables: default_tables(),
            extra_params: Query::new(),
            limit,
            page: 1,
        }
    }

    /// Jobs of a single user. The user column is dropped since every row
    /// would repeat it.
    pub fn for_user(name: &str, limit: u32) -> Self {
        Self {
            title: format!("{name}'s Jobs"),
            columns: JOB_COLUMNS
                .iter()
                .copied()
                .filter(|c| c.key != "user")
                .collect(),
            tables: default_tables(),
            extra_params: Query::new().with("user", name),
            limit,
            page: 1,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Query issued for `table`: its own params, then the view's extra
    /// params, then `max`.
    ///
    /// Paging is client-side over the fetched records, so the query always
    /// asks for the first page.
    pub fn query_for(&self, table: &TableSpec) -> Query {
        table
            .params
            .clone()
            .merge(&self.extra_params)
            .with_pagination(self.limit, 1)
    }
}

/// Render one cell of a job row.
pub fn format_cell(column: &Column, record: &Record, root: &str) -> String {
    match column.key {
        "jobid" => job_link(root, &text_field(record, "jobid")),
        "user" => user_link(root, &text_field(record, "user")),
        "start_time" => number_field(record, "start_time")
            .map(format_time)
            .unwrap_or_default(),
        "command" => command_cell(&text_field(record, "command")),
        "range" => {
            let range = record.get("range").map(normalize_range).unwrap_or_default();
            targets_cell(&range)
        }
        key => text_field(record, key),
    }
}

pub fn format_job_row(columns: &[Column], record: &Record, root: &str) -> Vec<String> {
    columns
        .iter()
        .map(|column| format_cell(column, record, root))
        .collect()
}
