//! Proof ledger stub server for local development.
//!
//! Environment:
//! - `LEDGER_STUB_PORT` (default 8090)
//! - `LEDGER_STUB_TOKEN` (optional bearer token for record routes)

use std::net::SocketAddr;

use anyhow::Context;
use proofnest_ledger_stub::{router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("LEDGER_STUB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8090);
    let token = std::env::var("LEDGER_STUB_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    if token.is_some() {
        tracing::info!("bearer token required on /v1/records");
    }

    let app = router(AppState::new(token));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("proofnest-ledger-stub listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;
    Ok(())
}
