//! pbxgauge exporter
//!
//! - Refresh loop: every interval, query PostgreSQL and rewrite the gauges
//! - HTTP: `GET /metrics` renders whatever the registry holds right now
//! - Ctrl-C / SIGTERM stops both; a failed refresh under `--on-error exit`
//!   stops the process with a non-zero status

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use pbxgauge_core::error::{ExporterError, Result};
use pbxgauge_exporter::{app_state, cli::Cli, config, refresh::Scheduler, router, source::PgSource};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), error = %e, "pbxgauge-exporter exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = config::resolve(&cli)?;
    let listen = cfg.exporter.listen_addr()?;
    tracing::debug!(database = ?cfg.database, refresh = ?cfg.refresh, "config resolved");

    let state = app_state::AppState::new(cfg)?;
    let source = Arc::new(PgSource::new(&state.cfg().database, &state.cfg().refresh));
    let scheduler = Scheduler::from_config(state.registry(), source, &state.cfg().refresh);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut refresh = tokio::spawn(scheduler.run(shutdown_rx.clone()));

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ExporterError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "pbxgauge-exporter starting");

    let app = router::build_router(state);
    let mut server_rx = shutdown_rx;
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_rx.changed().await;
            })
            .await
    });

    let mut refresh_done = None;
    tokio::select! {
        () = shutdown_signal() => tracing::info!("shutdown signal received"),
        joined = &mut refresh => refresh_done = Some(joined),
    }
    let _ = shutdown_tx.send(true);

    let refresh_result = match refresh_done {
        Some(joined) => joined,
        None => refresh.await,
    };
    let server_result = server.await;

    refresh_result.map_err(|e| ExporterError::Internal(format!("refresh task failed: {e}")))??;
    server_result
        .map_err(|e| ExporterError::Internal(format!("server task failed: {e}")))?
        .map_err(|e| ExporterError::Internal(format!("server failed: {e}")))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
