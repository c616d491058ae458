//! # API Error Types
//!
//! Maps [`ProofError`] and request-shape failures to HTTP status codes and
//! a flat JSON body `{error, code, hash?}`.
//!
//! The 500 body never carries the internal message. Every download
//! rejection renders the same 403 body.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use proofnest_core::ProofError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code, e.g. `ALREADY_REGISTERED`.
    pub code: String,
    /// Fingerprint the error refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Protocol failure.
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// Request body exceeded the transport limit before the file field
    /// could be measured.
    #[error("request body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize },

    /// Request could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Failure inside the proxy itself (500). Logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Proof(err) => {
                let status = match err {
                    ProofError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    ProofError::AlreadyRegistered { .. } => StatusCode::CONFLICT,
                    ProofError::NotFound { .. } => StatusCode::NOT_FOUND,
                    ProofError::LedgerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    ProofError::AccessDenied => StatusCode::FORBIDDEN,
                    ProofError::MalformedInput(_) => StatusCode::BAD_REQUEST,
                    ProofError::UnknownError(_) => StatusCode::BAD_GATEWAY,
                };
                (status, err.code())
            }
            Self::BodyTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "MALFORMED_INPUT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UNKNOWN_ERROR"),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Classify a multipart read failure. Length-limit failures become 413.
    pub fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::BodyTooLarge { limit }
        } else {
            Self::BadRequest(err.body_text())
        }
    }

    fn hash(&self) -> Option<String> {
        match self {
            Self::Proof(ProofError::AlreadyRegistered { hash })
            | Self::Proof(ProofError::NotFound { hash, .. }) => Some(hash.clone()),
            _ => None,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Proof(ProofError::NotFound { message, .. }) => message.clone(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Proof(ProofError::UnknownError(_)) => tracing::error!(error = %self, "ledger error"),
            Self::Proof(ProofError::LedgerUnavailable(_)) => {
                tracing::warn!(error = %self, "ledger unavailable")
            }
            _ => {}
        }

        let body = ErrorBody {
            error: message,
            code: code.to_string(),
            hash: self.hash(),
        };

        (status, Json(body)).into_response()
    }
}
