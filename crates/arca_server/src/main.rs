//! HTTP server entry point.

mod config;
mod routes;

use anyhow::Context;
use arca_core::{init_logging, Spreadsheet, SqliteSource};
use clap::Parser;
use config::Config;
use log::{info, warn};
use routes::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    init_logging(&config.log_level, config.log_target()).map_err(anyhow::Error::msg)?;
    config.log_summary();

    let source = SqliteSource::open(&config.db_path).with_context(|| {
        format!("failed to open tabular store `{}`", config.db_path.display())
    })?;
    let state = AppState {
        spreadsheet: Arc::new(Spreadsheet::new(Arc::new(source))),
        request_timeout: config.request_timeout(),
    };

    let listener = TcpListener::bind(config.server_address)
        .await
        .with_context(|| format!("failed to bind {}", config.server_address))?;
    info!(
        "event=server_start module=server status=ok address={} version={}",
        listener.local_addr()?,
        arca_core::core_version()
    );

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("event=shutdown_signal module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("event=shutdown_signal module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("event=shutdown_signal module=server status=ok");
}
