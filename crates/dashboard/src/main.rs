//! `pogo-dashboard` -- terminal dashboard for the Pogo job service.
//!
//! Renders the page at `PATH` (default: the page root) as plain-text
//! tables, optionally refreshing on an interval until Ctrl-C.
//!
//! # Environment variables
//!
//! | Variable                | Default                    | Description                      |
//! |-------------------------|----------------------------|----------------------------------|
//! | `POGO_WS_ROOT`          | `http://localhost:7657/v1` | Job web-service root             |
//! | `POGO_ROOT`             | `/pogo/`                   | Page root used to resolve `PATH` |
//! | `POGO_PAGE_SIZE`        | `25`                       | Rows per table page              |
//! | `POGO_FETCH_TIMEOUT_MS` | `2000`                     | Per-request timeout              |
//! | `POGO_REFRESH_SECS`     | `0`                        | Refresh interval, `0` disables   |

use std::sync::Arc;

use clap::Parser;
use pogo_client::api::PogoApi;
use pogo_core::env::Env;
use pogo_dashboard::app::App;
use pogo_dashboard::config::{refresh_interval, DashboardConfig};
use pogo_dashboard::render::TextRenderer;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pogo-dashboard")]
#[command(version)]
#[command(about = "Terminal dashboard for the Pogo job service")]
struct Cli {
    /// Page to show, e.g. `/pogo/user/alice` or `/pogo/job/p0000000001`
    path: Option<String>,

    /// Table page to start on
    #[arg(long, default_value = "1")]
    page: u32,

    /// Refresh interval in seconds (overrides POGO_REFRESH_SECS, 0 disables)
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Job web-service root (overrides POGO_WS_ROOT)
    #[arg(long)]
    ws_root: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pogo_dashboard=info,pogo_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::from_env()?;
    if let Some(ws_root) = cli.ws_root {
        config.env = Env::new(config.env.root.clone(), ws_root);
    }
    if let Some(secs) = cli.refresh_secs {
        config.refresh = refresh_interval(secs);
    }
    let path = cli.path.unwrap_or_else(|| config.env.root.clone());

    tracing::info!(
        ws_root = %config.env.ws_root,
        path = %path,
        page_size = config.page_size,
        refresh_secs = config.refresh.map(|d| d.as_secs()),
        "Starting pogo-dashboard",
    );

    let api = PogoApi::new(config.env.clone(), config.fetch_timeout)?;
    let renderer = TextRenderer::stdout(config.env.root.clone());

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    let app = App::new(config, Arc::new(api), Arc::new(renderer), cancel);
    app.run(&path, cli.page).await?;

    tracing::info!("pogo-dashboard stopped");
    Ok(())
}
