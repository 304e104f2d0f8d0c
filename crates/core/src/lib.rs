//! Domain logic for the Pogo job dashboard.
//!
//! Pure functions and types only: records and queries, the pager and its
//! page window, host-row derivation, cell formatters, endpoint templates
//! and page routes. Nothing in this crate performs I/O.

pub mod env;
pub mod error;
pub mod format;
pub mod hosts;
pub mod job;
pub mod pager;
pub mod routes;
pub mod types;
