//! Table controller task.
//!
//! A [`TableController`] owns one [`TableBinding`] and drives it from a
//! tokio task. Commands arrive over an `mpsc` channel from any number of
//! [`TableHandle`]s. Each load is fetched on its own task and reported back
//! to the controller loop, so page changes keep being served while a fetch
//! is in flight. A fetch task that panics settles its load as a transport
//! failure.
//!
//! The controller stops when its [`CancellationToken`] is cancelled, or once
//! every handle has been dropped and no load is left in flight.

use std::sync::Arc;

use pogo_client::source::{FetchedJobs, JobSource};
use pogo_core::error::{FetchCause, FetchError, Resource};
use pogo_core::types::Query;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::collection::LoadTicket;
use crate::error::DashboardError;
use crate::render::Renderer;
use crate::table::{TableBinding, TableFrame};
use crate::views::multi_table::Column;

/// Capacity of a controller's command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    /// Fetch `Query`, superseding any fetch still in flight.
    Load(Query),
    /// Show page `n` (1-based).
    SetPage(u32),
    /// Re-issue the most recent load.
    Refresh,
}

/// Cloneable sender side of a running controller.
#[derive(Debug, Clone)]
pub struct TableHandle {
    tx: mpsc::Sender<TableCommand>,
}

impl TableHandle {
    pub async fn load(&self, query: Query) -> Result<(), DashboardError> {
        self.send(TableCommand::Load(query)).await
    }

    pub async fn set_page(&self, page: u32) -> Result<(), DashboardError> {
        self.send(TableCommand::SetPage(page)).await
    }

    pub async fn refresh(&self) -> Result<(), DashboardError> {
        self.send(TableCommand::Refresh).await
    }

    async fn send(&self, command: TableCommand) -> Result<(), DashboardError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| DashboardError::ControllerClosed)
    }
}

type Settled = (LoadTicket, Result<FetchedJobs, FetchError>);

pub struct TableController {
    name: String,
    columns: Vec<Column>,
    binding: TableBinding,
    source: Arc<dyn JobSource>,
    renderer: Arc<dyn Renderer>,
    cancel: CancellationToken,
    /// Query of the most recently issued load.
    last_query: Option<Query>,
}

impl TableController {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Column>,
        binding: TableBinding,
        source: Arc<dyn JobSource>,
        renderer: Arc<dyn Renderer>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            binding,
            source,
            renderer,
            cancel,
            last_query: None,
        }
    }

    /// Start the controller loop. The task resolves to the final binding
    /// state once the controller stops.
    pub fn spawn(self) -> (TableHandle, JoinHandle<TableBinding>) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let task = tokio::spawn(self.run(rx));
        (TableHandle { tx }, task)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<TableCommand>) -> TableBinding {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Settled>();
        let mut closed = false;
        let cancel = self.cancel.clone();

        tracing::debug!(table = %self.name, "Table controller started");

        loop {
            // Commands are taken before fetch results so a page request sent
            // ahead of a result is applied against the load it was queued on.
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!(table = %self.name, "Table controller cancelled");
                    break;
                }
                command = commands.recv(), if !closed => match command {
                    Some(command) => self.handle(command, &done_tx),
                    None => {
                        closed = true;
                        if !self.binding.is_loading() {
                            break;
                        }
                    }
                },
                Some((ticket, result)) = done_rx.recv() => {
                    if let Some(frame) = self.binding.settle(ticket, result) {
                        self.render(&frame);
                    }
                    if closed && !self.binding.is_loading() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(table = %self.name, "Table controller stopped");
        self.binding
    }

    fn handle(&mut self, command: TableCommand, done: &mpsc::UnboundedSender<Settled>) {
        match command {
            TableCommand::Load(query) => self.start_load(query, done),
            TableCommand::SetPage(page) => {
                if let Some(frame) = self.binding.request_page(page) {
                    self.render(&frame);
                }
            }
            TableCommand::Refresh => match self.last_query.clone() {
                Some(query) => self.start_load(query, done),
                None => tracing::debug!(table = %self.name, "Refresh before first load ignored"),
            },
        }
    }

    fn start_load(&mut self, query: Query, done: &mpsc::UnboundedSender<Settled>) {
        self.last_query = Some(query.clone());
        let ticket = self.binding.request_load(query);
        tracing::debug!(
            table = %self.name,
            generation = ticket.generation(),
            "Loading table",
        );
        self.render(&self.binding.frame());

        let source = Arc::clone(&self.source);
        let query = ticket.query().clone();
        let mut fetch = tokio::spawn(async move { source.fetch_jobs(&query).await });

        let name = self.name.clone();
        let cancel = self.cancel.clone();
        let done = done.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => fetch.abort(),
                joined = &mut fetch => {
                    let result = joined.unwrap_or_else(|e| {
                        tracing::warn!(table = %name, error = %e, "Fetch task failed");
                        Err(FetchError::new(
                            Resource::Jobs,
                            FetchCause::Transport(format!("fetch task failed: {e}")),
                        ))
                    });
                    // The controller may already be gone.
                    let _ = done.send((ticket, result));
                }
            }
        });
    }

    fn render(&self, frame: &TableFrame) {
        self.renderer.render_table(&self.name, &self.columns, frame);
    }
}
