//! Page views built on top of tables and loaded jobs.

pub mod job;
pub mod multi_table;

pub use job::{HostView, JobDetail, JobMetadata, JobView};
pub use multi_table::{Column, MultiTableView, TableSpec};
