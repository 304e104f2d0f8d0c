//! Read-only client for the Pogo job web service.
//!
//! Provides the [`JobSource`](source::JobSource) seam used by collections
//! and views, an HTTP implementation in [`api`], and the envelope decoding
//! shared by both endpoints.

pub mod api;
pub mod envelope;
pub mod source;
