//! # Verification
//!
//! `POST /verify` takes `{hash, includeContent?}`; `POST /verify-file`
//! takes a multipart `file` and answers with the same shape plus the
//! upload's `filename`.
//!
//! A hit is 200 `{verified: true, user, ...}`. A miss is 404
//! `{verified: false, message: "not found", hash}` and always echoes the
//! queried hash.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use proofnest_core::ContentDigest;
use proofnest_protocol::verifier::NOT_FOUND_MESSAGE;
use proofnest_protocol::{VerifiedProof, VerifyOptions, VerifyOutcome};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::metrics::{ApiMetrics, VerificationOutcome};
use crate::routes::form::UploadForm;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify", post(verify))
        .route("/verify-file", post(verify_file))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub include_content: bool,
}

/// 200 body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedBody {
    pub verified: bool,
    /// Registering principal.
    pub user: String,
    /// RFC 3339 rendering of `timestamp`, or `Unknown`.
    pub timestamp_display: String,
    #[serde(flatten)]
    pub proof: VerifiedProof,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// 404 body.
#[derive(Debug, Serialize)]
pub struct NotVerifiedBody {
    pub verified: bool,
    pub message: &'static str,
    pub hash: ContentDigest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

fn render(outcome: VerifyOutcome, filename: Option<String>) -> Response {
    match outcome {
        VerifyOutcome::Found(proof) => {
            let body = VerifiedBody {
                verified: true,
                user: proof.owner.to_string(),
                timestamp_display: proof.timestamp.display(),
                proof: *proof,
                filename,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        VerifyOutcome::NotFound { hash } => {
            let body = NotVerifiedBody {
                verified: false,
                message: NOT_FOUND_MESSAGE,
                hash,
                filename,
            };
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    }
}

fn record(metrics: Option<Extension<ApiMetrics>>, result: &Result<VerifyOutcome, AppError>) {
    let Some(Extension(metrics)) = metrics else {
        return;
    };
    let outcome = match result {
        Ok(VerifyOutcome::Found(proof)) if proof.is_degraded() => VerificationOutcome::Degraded,
        Ok(VerifyOutcome::Found(_)) => VerificationOutcome::Verified,
        Ok(VerifyOutcome::NotFound { .. }) => VerificationOutcome::NotFound,
        Err(_) => VerificationOutcome::Failed,
    };
    metrics.record_verification(outcome);
}

async fn verify(
    State(state): State<AppState>,
    metrics: Option<Extension<ApiMetrics>>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body?;
    let hash = request
        .hash
        .ok_or_else(|| AppError::bad_request("hash is required"))?;
    let options = VerifyOptions {
        include_content: request.include_content,
    };

    let result = state
        .registry
        .verify_by_hash(&hash, options)
        .await
        .map_err(AppError::from);
    record(metrics, &result);
    Ok(render(result?, None))
}

async fn verify_file(
    State(state): State<AppState>,
    metrics: Option<Extension<ApiMetrics>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = UploadForm::read(multipart, state.config.max_upload_bytes).await?;
    let file = form.take_file()?;
    let options = VerifyOptions {
        include_content: form.flag("includeContent", false)?,
    };

    let result = state
        .registry
        .verify_by_file(&file.bytes, options)
        .await
        .map_err(AppError::from);
    record(metrics, &result);
    Ok(render(result?, file.filename))
}
