//! Render targets.
//!
//! Controllers and views hand finished frames to a [`Renderer`]. The
//! binary uses [`TextRenderer`] to print plain-text tables; tests use
//! [`RecordingRenderer`] to inspect what would have been drawn.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::table::TableFrame;
use crate::views::job::{host_cells, HOST_COLUMNS};
use crate::views::multi_table::{format_job_row, Column};
use crate::views::{HostView, JobView};

/// Sink for rendered pages. Shared between all table controllers of a page.
pub trait Renderer: Send + Sync {
    fn render_title(&self, title: &str);

    /// Draw `frame` for the table labelled `table`.
    fn render_table(&self, table: &str, columns: &[Column], frame: &TableFrame);

    fn render_job(&self, view: &JobView);

    fn render_host(&self, view: &HostView);

    fn render_error(&self, message: &str);
}

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

/// Writes aligned plain-text tables to any [`Write`] target.
pub struct TextRenderer<W> {
    out: Mutex<W>,
    root: String,
}

impl TextRenderer<io::Stdout> {
    pub fn stdout(root: impl Into<String>) -> Self {
        Self::new(io::stdout(), root)
    }
}

impl<W: Write + Send> TextRenderer<W> {
    /// `root` is the page root used when formatting links.
    pub fn new(out: W, root: impl Into<String>) -> Self {
        Self {
            out: Mutex::new(out),
            root: root.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write rendered output");
        }
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render_title(&self, title: &str) {
        self.write(&format!("{title}\n{}\n", "=".repeat(title.chars().count())));
    }

    fn render_table(&self, table: &str, columns: &[Column], frame: &TableFrame) {
        let header: Vec<String> = columns.iter().map(|c| c.label.to_string()).collect();
        let rows: Vec<Vec<String>> = frame
            .rows
            .iter()
            .map(|record| format_job_row(columns, record, &self.root))
            .collect();

        let mut text = format!("\n[{table}]\n");
        text.push_str(&layout(&header, &rows));
        text.push_str(&format!(
            "page {}/{} ({} jobs)\n",
            frame.page, frame.page_count, frame.total_items
        ));
        if let Some(message) = frame.status.message() {
            text.push_str(&message);
            text.push('\n');
        }
        self.write(&text);
    }

    fn render_job(&self, view: &JobView) {
        let mut text = format!("\n{}\n", view.header);
        text.push_str(&metadata_block(view.metadata.fields()));
        if view.metadata.haltable {
            text.push_str("(haltable)\n");
        }

        let header: Vec<String> = HOST_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows: Vec<Vec<String>> = view
            .hosts
            .iter()
            .map(|row| host_cells(row, &self.root))
            .collect();
        text.push_str(&format!("\n{}\n", view.hosts_header));
        text.push_str(&layout(&header, &rows));
        self.write(&text);
    }

    fn render_host(&self, view: &HostView) {
        let mut text = format!("\n{}\n", view.header);
        text.push_str(&metadata_block(view.metadata.fields()));
        text.push_str(&format!("Log: {}\n", view.log_url));
        self.write(&text);
    }

    fn render_error(&self, message: &str) {
        self.write(&format!("Error: {message}\n"));
    }
}

fn metadata_block(fields: Vec<(&str, &str)>) -> String {
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    fields
        .into_iter()
        .map(|(label, value)| format!("{label:<width$}  {value}\n"))
        .collect()
}

/// Lay out `rows` under `header` with columns padded to their widest cell.
fn layout(header: &[String], rows: &[Vec<String>]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| plain_text(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut text = line(header);
    for row in &rows {
        text.push_str(&line(row));
    }
    text
}

/// Strip markup from a formatted cell and decode the entities the cell
/// formatters produce.
pub fn plain_text(cell: &str) -> String {
    let mut text = String::with_capacity(cell.len());
    let mut in_tag = false;
    for c in cell.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&#x60;", "`")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// One call made on a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Title(String),
    Table { table: String, frame: TableFrame },
    Job(JobView),
    Host(HostView),
    Error(String),
}

/// Keeps everything it is asked to render. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<Vec<Rendered>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> Vec<Rendered> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Frames rendered for `table`, oldest first.
    pub fn frames(&self, table: &str) -> Vec<TableFrame> {
        self.rendered()
            .into_iter()
            .filter_map(|r| match r {
                Rendered::Table { table: t, frame } if t == table => Some(frame),
                _ => None,
            })
            .collect()
    }

    fn push(&self, rendered: Rendered) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(rendered);
    }
}

impl Renderer for RecordingRenderer {
    fn render_title(&self, title: &str) {
        self.push(Rendered::Title(title.to_string()));
    }

    fn render_table(&self, table: &str, _columns: &[Column], frame: &TableFrame) {
        self.push(Rendered::Table {
            table: table.to_string(),
            frame: frame.clone(),
        });
    }

    fn render_job(&self, view: &JobView) {
        self.push(Rendered::Job(view.clone()));
    }

    fn render_host(&self, view: &HostView) {
        self.push(Rendered::Host(view.clone()));
    }

    fn render_error(&self, message: &str) {
        self.push(Rendered::Error(message.to_string()));
    }
}
