//! Route definitions for the ledger stub.
//!
//! Implements the endpoints that `proofnest-ledger-client`'s `HttpLedger`
//! calls, with camelCase JSON bodies and base64 record content.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Request, State},
    http::{header, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use proofnest_core::{ContentDigest, LedgerEntry, MAX_PAYLOAD_BYTES};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::store::AppState;

/// Largest accepted write body: a maximum-size payload in base64 plus
/// room for the metadata fields.
pub const MAX_RECORD_BODY_BYTES: usize = MAX_PAYLOAD_BYTES.div_ceil(3) * 4 + 64 * 1024;

/// Build the complete router.
pub fn router(state: AppState) -> Router {
    let records = Router::new()
        .route("/v1/records", get(list_records).post(write_record))
        .route("/v1/records/:hash", get(read_record))
        .layer(DefaultBodyLimit::max(MAX_RECORD_BODY_BYTES))
        .layer(from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health))
        .merge(records)
        // Fallback: 501 Not Implemented
        .fallback(not_implemented)
        .with_state(state)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Bearer-token check, active only when the stub was started with a token.
async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.token() else {
        return next.run(request).await;
    };
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match presented {
        Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => next.run(request).await,
        _ => error(StatusCode::UNAUTHORIZED, "missing or invalid bearer token"),
    }
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> StatusCode {
    StatusCode::OK
}

// ── Records ─────────────────────────────────────────────────────────

async fn write_record(
    State(state): State<AppState>,
    body: Result<Json<LedgerEntry>, JsonRejection>,
) -> Response {
    let entry = match body {
        Ok(Json(entry)) => entry,
        Err(rejection) => {
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            return error(status, &rejection.body_text());
        }
    };

    if let Some(content) = &entry.content {
        if ContentDigest::of(content) != entry.hash {
            return error(StatusCode::UNPROCESSABLE_ENTITY, "content does not match hash");
        }
    }

    let hash = entry.hash;
    match state.insert(entry) {
        Ok(timestamp) => {
            tracing::info!(hash = %hash, timestamp, "record written");
            (
                StatusCode::CREATED,
                Json(json!({ "hash": hash, "timestamp": timestamp })),
            )
                .into_response()
        }
        Err(existing) => {
            tracing::info!(hash = %existing, "write conflict");
            (
                StatusCode::CONFLICT,
                Json(json!({ "error": "hash already registered", "hash": existing })),
            )
                .into_response()
        }
    }
}

async fn read_record(State(state): State<AppState>, Path(hash): Path<String>) -> Response {
    let hash = match ContentDigest::parse(&hash) {
        Ok(hash) => hash,
        Err(e) => return error(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    match state.records().get(&hash) {
        Some(record) => Json(record.value().clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_records(State(state): State<AppState>) -> Response {
    Json(state.list()).into_response()
}

async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}
