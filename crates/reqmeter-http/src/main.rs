//! reqmeter service
//!
//! - `GET /`        : application route
//! - `GET /metrics` : Prometheus exposition of request count/latency
//!
//! Config path: first CLI argument, else `$REQMETER_CONFIG`, else
//! `reqmeter.yaml`.

use tracing_subscriber::{fmt, EnvFilter};

use reqmeter_core::error::{ReqMeterError, Result};
use reqmeter_http::{app_state, config, router};

const DEFAULT_CONFIG_PATH: &str = "reqmeter.yaml";

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "reqmeter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("REQMETER_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;
    let metrics_path = cfg.metrics.path.clone();

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, %metrics_path, config = %path, "reqmeter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ReqMeterError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ReqMeterError::Internal(format!("server failed: {e}")))?;

    tracing::info!("reqmeter stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
