//! # Middleware Stack
//!
//! - [`metrics`]: Prometheus request metrics and protocol outcome counters.
//! - [`cors`]: cross-origin policy for browser clients.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` directly.

pub mod cors;
pub mod metrics;
