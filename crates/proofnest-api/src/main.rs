//! # proofnest-api — Binary Entry Point
//!
//! Reads configuration from the environment, connects the configured
//! ledger, and serves the proxy on `PORT` (default 8000).

use anyhow::Context;
use proofnest_api::state::{AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("PROOFNEST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    let port = config.port;
    tracing::info!(?config, "configuration loaded");

    let state = AppState::from_config(config).context("failed to initialise ledger")?;
    let app = proofnest_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("proofnest-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
