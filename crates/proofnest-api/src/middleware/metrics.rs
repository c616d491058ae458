//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Registration and verification outcomes are counted by the
//! handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::core::Collector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome label for `proofnest_registrations_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    Conflict,
    Rejected,
    Failed,
}

impl RegistrationOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Conflict => "conflict",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Outcome label for `proofnest_verifications_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    Degraded,
    NotFound,
    Failed,
}

impl VerificationOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Degraded => "degraded",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
        }
    }
}

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,
    registrations_total: IntCounterVec,
    verifications_total: IntCounterVec,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

fn sum(counter: &IntCounterVec) -> u64 {
    counter
        .collect()
        .iter()
        .flat_map(|mf| mf.get_metric())
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("proofnest_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "proofnest_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new("proofnest_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let registrations_total = IntCounterVec::new(
            Opts::new("proofnest_registrations_total", "Registration attempts by outcome"),
            &["outcome"],
        )
        .expect("metric can be created");

        let verifications_total = IntCounterVec::new(
            Opts::new("proofnest_verifications_total", "Verification lookups by outcome"),
            &["outcome"],
        )
        .expect("metric can be created");

        for collector in [
            Box::new(http_requests_total.clone()) as Box<dyn Collector>,
            Box::new(http_request_duration_seconds.clone()),
            Box::new(http_errors_total.clone()),
            Box::new(registrations_total.clone()),
            Box::new(verifications_total.clone()),
        ] {
            registry
                .register(collector)
                .expect("metric can be registered");
        }

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                registrations_total,
                verifications_total,
            }),
        }
    }

    /// Total request count across all labels.
    pub fn requests(&self) -> u64 {
        sum(&self.inner.http_requests_total)
    }

    /// Total 4xx/5xx count across all labels.
    pub fn errors(&self) -> u64 {
        sum(&self.inner.http_errors_total)
    }

    pub fn registrations(&self, outcome: RegistrationOutcome) -> u64 {
        self.inner
            .registrations_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    pub fn verifications(&self, outcome: VerificationOutcome) -> u64 {
        self.inner
            .verifications_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    pub fn record_registration(&self, outcome: RegistrationOutcome) {
        self.inner
            .registrations_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn record_verification(&self, outcome: VerificationOutcome) {
        self.inner
            .verifications_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer).map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Label for a path no route matched. Hex fingerprints collapse to
/// `{hash}` so probing random hashes cannot blow up label cardinality.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.len() >= 32 && segment.chars().all(|c| c.is_ascii_hexdigit()) {
                "{hash}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware that records HTTP request metrics via Prometheus.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(request.uri().path()),
    };
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        m.record_request(&method, &path, response.status().as_u16(), duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let m = ApiMetrics::new();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
        assert_eq!(m.registrations(RegistrationOutcome::Registered), 0);
    }

    #[test]
    fn errors_count_only_4xx_and_5xx() {
        let m = ApiMetrics::new();
        m.record_request("POST", "/register", 200, 0.01);
        m.record_request("POST", "/register", 409, 0.01);
        m.record_request("POST", "/verify", 503, 0.2);
        assert_eq!(m.requests(), 3);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn outcome_counters_are_labelled() {
        let m = ApiMetrics::new();
        m.record_registration(RegistrationOutcome::Registered);
        m.record_registration(RegistrationOutcome::Conflict);
        m.record_registration(RegistrationOutcome::Conflict);
        m.record_verification(VerificationOutcome::Degraded);
        assert_eq!(m.registrations(RegistrationOutcome::Registered), 1);
        assert_eq!(m.registrations(RegistrationOutcome::Conflict), 2);
        assert_eq!(m.verifications(VerificationOutcome::Degraded), 1);
        assert_eq!(m.verifications(VerificationOutcome::NotFound), 0);
    }

    #[test]
    fn hex_segments_collapse() {
        let hash = "a".repeat(64);
        assert_eq!(normalize_path(&format!("/records/{hash}")), "/records/{hash}");
        assert_eq!(normalize_path("/files"), "/files");
        assert_eq!(normalize_path("/deadbeef"), "/deadbeef");
    }

    #[test]
    fn encodes_metric_names() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/files", 200, 0.001);
        m.record_registration(RegistrationOutcome::Registered);
        let text = m.gather_and_encode().unwrap();
        assert!(text.contains("proofnest_http_requests_total"));
        assert!(text.contains("proofnest_registrations_total"));
    }

    #[test]
    fn concurrent_increments_are_safe() {
        let m = ApiMetrics::new();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let m = m.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        m.record_request("GET", "/files", 200, 0.001);
                        m.record_request("POST", "/download", 403, 0.001);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(m.requests(), 8000);
        assert_eq!(m.errors(), 4000);
    }
}
