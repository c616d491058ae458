//! # proofnest-api — HTTP Proxy for the Proof Registry
//!
//! Thin JSON/multipart surface over [`proofnest_protocol::ProofRegistry`].
//! Handlers parse the request, call one protocol operation, and map the
//! result to a status code. No record state lives in this crate.
//!
//! ## API Surface
//!
//! | Route | Module | Operation |
//! |-------|--------|-----------|
//! | `POST /register` | [`routes::register`] | Register an upload |
//! | `POST /verify` | [`routes::verify`] | Verify a hex fingerprint |
//! | `POST /verify-file` | [`routes::verify`] | Verify an upload |
//! | `POST /download` | [`routes::download`] | Passkey-gated download |
//! | `GET /files` | [`routes::files`] | Public listing |
//! | `GET /health/liveness` | here | Process is up |
//! | `GET /health/readiness` | here | Ledger answers |
//! | `GET /metrics` | here | Prometheus scrape |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → MetricsMiddleware → body limit → Handler
//! ```

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Room for multipart boundaries and text fields on top of the file limit.
pub const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

/// Check if metrics are enabled via the `PROOFNEST_METRICS_ENABLED` env var.
/// Defaults to `true` when the variable is absent or set to anything other
/// than `"false"`.
fn metrics_enabled() -> bool {
    std::env::var("PROOFNEST_METRICS_ENABLED")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true)
}

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = metrics_enabled();
    let body_limit = state.config.max_upload_bytes + MULTIPART_SLACK_BYTES;

    let mut api = Router::new()
        .merge(routes::register::router())
        .merge(routes::verify::router())
        .merge(routes::download::router())
        .merge(routes::files::router())
        .layer(DefaultBodyLimit::max(body_limit));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api.layer(TraceLayer::new_for_http()).with_state(state.clone());

    let mut health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if metrics_on {
        health = health
            .route("/metrics", get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let health = health.with_state(state.clone());

    Router::new()
        .merge(health)
        .merge(api)
        .layer(middleware::cors::cors_layer(&state.config.cors_allow_origins))
}

/// GET /metrics — Prometheus text exposition.
async fn prometheus_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness check. 200 whenever the process is serving.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check. 200 `ready` when the ledger answers its health check
/// within the registry timeout, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.registry.ledger_health().await {
        Ok(()) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::warn!(backend = state.registry.backend(), "readiness check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "ledger unreachable").into_response()
        }
    }
}
