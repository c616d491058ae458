//! Ledger client error types.

use proofnest_core::ProofError;

/// Errors from ledger calls.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// HTTP transport error (connection refused, reset, timed out).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Ledger returned an unexpected status.
    #[error("ledger {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The backend is not accepting calls.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl From<LedgerError> for ProofError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::Http { .. } | LedgerError::Unavailable(_) => {
                ProofError::LedgerUnavailable(err.to_string())
            }
            LedgerError::ApiError { status, .. } if *status >= 500 => {
                ProofError::LedgerUnavailable(err.to_string())
            }
            LedgerError::ApiError { .. }
            | LedgerError::Deserialization { .. }
            | LedgerError::Config(_) => ProofError::UnknownError(err.to_string()),
        }
    }
}
