//! Page dispatch.
//!
//! [`App::run`] resolves a request path to a [`Route`] and drives the page
//! behind it: one table controller per table for job listings, or a
//! [`JobDetail`] for job and host pages. With a refresh interval configured
//! the page keeps polling until the cancellation token fires.

use std::sync::Arc;

use futures::future::join_all;
use pogo_client::source::JobSource;
use pogo_core::routes::Route;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::collection::TotalSource;
use crate::config::DashboardConfig;
use crate::controller::{TableController, TableHandle};
use crate::error::DashboardError;
use crate::render::Renderer;
use crate::table::TableBinding;
use crate::views::{HostView, JobDetail, JobView, MultiTableView};

pub struct App {
    config: DashboardConfig,
    source: Arc<dyn JobSource>,
    renderer: Arc<dyn Renderer>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(
        config: DashboardConfig,
        source: Arc<dyn JobSource>,
        renderer: Arc<dyn Renderer>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            source,
            renderer,
            cancel,
        }
    }

    /// Show the page at `path`, starting job tables on `page`.
    pub async fn run(&self, path: &str, page: u32) -> Result<(), DashboardError> {
        let route = Route::parse(&self.config.env.root, path);
        tracing::info!(path, route = ?route, "Rendering page");
        self.renderer.render_title(&route.title());

        let limit = self.config.page_size;
        match route {
            Route::Home | Route::Unknown { .. } => {
                self.run_tables(MultiTableView::dashboard(limit).with_page(page))
                    .await
            }
            Route::User { name } => {
                self.run_tables(MultiTableView::for_user(&name, limit).with_page(page))
                    .await
            }
            Route::Job { jobid } => self.run_job(&jobid, None).await,
            Route::Host { jobid, hostname } => self.run_job(&jobid, Some(&hostname)).await,
        }
    }

    async fn run_tables(&self, view: MultiTableView) -> Result<(), DashboardError> {
        self.renderer.render_title(&view.title);

        let cancel = self.cancel.child_token();
        let mut handles: Vec<TableHandle> = Vec::with_capacity(view.tables.len());
        let mut tasks = Vec::with_capacity(view.tables.len());

        for table in &view.tables {
            // Records are paged locally, so the pager total is what was fetched.
            let binding =
                TableBinding::new(view.limit, TotalSource::RecordCount).with_initial_page(view.page);
            let controller = TableController::new(
                table.label.clone(),
                view.columns.clone(),
                binding,
                Arc::clone(&self.source),
                Arc::clone(&self.renderer),
                cancel.clone(),
            );
            let (handle, task) = controller.spawn();
            handle.load(view.query_for(table)).await?;
            handles.push(handle);
            tasks.push(task);
        }

        if let Some(mut ticker) = self.ticker() {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        tracing::debug!(tables = handles.len(), "Refreshing tables");
                        for handle in &handles {
                            handle.refresh().await?;
                        }
                    }
                }
            }
        }

        // Controllers finish their in-flight loads once every handle is gone.
        drop(handles);
        for (table, result) in view.tables.iter().zip(join_all(tasks).await) {
            if let Err(e) = result {
                tracing::error!(table = %table.label, error = %e, "Table controller panicked");
            }
        }
        Ok(())
    }

    async fn run_job(&self, jobid: &str, hostname: Option<&str>) -> Result<(), DashboardError> {
        let mut detail = JobDetail::new();
        let mut ticker = self.ticker();

        loop {
            let loaded = tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                result = detail.load(self.source.as_ref(), jobid) => result,
            };

            match loaded {
                Ok(()) => match hostname {
                    None => {
                        if let Some(view) = JobView::new(&detail) {
                            self.renderer.render_job(&view);
                        }
                    }
                    Some(hostname) => {
                        if let Some(view) = HostView::new(&detail, hostname) {
                            self.renderer.render_host(&view);
                        }
                    }
                },
                Err(e) => {
                    self.renderer.render_error(&e.to_string());
                    if ticker.is_none() {
                        return Err(e.into());
                    }
                }
            }

            let Some(ticker) = ticker.as_mut() else {
                return Ok(());
            };
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                _ = ticker.tick() => {}
            }
        }
    }

    /// Refresh ticker, first firing one period from now.
    fn ticker(&self) -> Option<Interval> {
        self.config.refresh.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        })
    }
}
