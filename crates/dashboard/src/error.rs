use pogo_client::api::ClientError;
use pogo_core::error::FetchError;

/// Errors raised by the dashboard outside of table rendering.
///
/// Failed table loads are not errors at this level: they are rendered as a
/// table status and the table keeps its previous rows.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// An environment variable or CLI flag has an unusable value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The job service client could not be created.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A single-job read failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The table controller behind a handle has stopped.
    #[error("Table controller has stopped")]
    ControllerClosed,
}
