//! # Registration
//!
//! `POST /register` takes a multipart form. The `file` part is required;
//! every other part is optional metadata:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `principal` | Caller identity. Anonymous when absent. |
//! | `hash` | Fingerprint computed by the client. Must match the upload. |
//! | `name` | Display name. Defaults to the upload's filename. |
//! | `description`, `ownerName` | Free text. |
//! | `ownerDob` | Download passkey. |
//! | `hasRoyalty`, `royaltyFee`, `contactDetails` | Informational royalty terms. |
//! | `storeContent` | Keep the bytes on the ledger (default `true`). |

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Extension, Json, Router};
use proofnest_core::{CallerSession, ContentDigest, LedgerTimestamp, Principal, ProofError, RoyaltyInfo};
use proofnest_protocol::{RegisterOutcome, RegistrationMetadata};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::metrics::{ApiMetrics, RegistrationOutcome};
use crate::routes::form::UploadForm;
use crate::state::AppState;

const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

/// Body of a successful registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub hash: ContentDigest,
    pub filename: String,
    pub file_type: String,
    /// Milliseconds since the epoch.
    pub timestamp: LedgerTimestamp,
}

async fn register(
    State(state): State<AppState>,
    metrics: Option<Extension<ApiMetrics>>,
    multipart: Multipart,
) -> Result<Json<RegisterResponse>, AppError> {
    let result = register_upload(&state, multipart).await;
    if let Some(Extension(metrics)) = metrics {
        metrics.record_registration(outcome_label(&result));
    }
    result.map(Json)
}

fn outcome_label(result: &Result<RegisterResponse, AppError>) -> RegistrationOutcome {
    match result {
        Ok(_) => RegistrationOutcome::Registered,
        Err(AppError::Proof(ProofError::AlreadyRegistered { .. })) => RegistrationOutcome::Conflict,
        Err(e) if e.status_and_code().0.is_client_error() => RegistrationOutcome::Rejected,
        Err(_) => RegistrationOutcome::Failed,
    }
}

async fn register_upload(state: &AppState, multipart: Multipart) -> Result<RegisterResponse, AppError> {
    let mut form = UploadForm::read(multipart, state.config.max_upload_bytes).await?;
    let file = form.take_file()?;

    let session = match form.text("principal") {
        Some(raw) => CallerSession::new(Principal::new(raw)?),
        None => CallerSession::anonymous(),
    };

    let filename = file.filename.clone().unwrap_or_default();
    let file_type = file
        .content_type
        .clone()
        .unwrap_or_else(|| DEFAULT_FILE_TYPE.to_string());

    let metadata = RegistrationMetadata {
        name: form.text("name").or_else(|| file.filename.clone()),
        description: form.text("description"),
        owner_name: form.text("ownerName"),
        owner_dob: form.text("ownerDob"),
        content_type: Some(file_type.clone()),
        royalty: RoyaltyInfo::new(
            form.flag("hasRoyalty", false)?,
            form.text("royaltyFee"),
            form.text("contactDetails"),
        ),
        store_content: form.flag("storeContent", true)?,
    };

    let outcome = match form.text("hash") {
        Some(claimed) => {
            state
                .registry
                .registrar()
                .register_claimed(&claimed, &file.bytes, metadata, &session)
                .await?
        }
        None => state.registry.register(&file.bytes, metadata, &session).await?,
    };

    match outcome {
        RegisterOutcome::Registered(receipt) => Ok(RegisterResponse {
            message: receipt.message,
            hash: receipt.hash,
            filename,
            file_type,
            timestamp: receipt.timestamp,
        }),
        RegisterOutcome::AlreadyRegistered { hash } => {
            tracing::info!(hash = %hash, principal = %session.principal, "registration conflict");
            Err(ProofError::AlreadyRegistered { hash: hash.to_hex() }.into())
        }
    }
}
