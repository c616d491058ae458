//! # Error Types
//!
//! The closed set of failures the proof registry protocol can surface.
//!
//! Conflicts and misses are ordinary outcomes at the protocol surface and
//! are modelled there as result variants. The `AlreadyRegistered` and
//! `NotFound` variants exist here so presentation layers that flatten
//! outcomes into errors (HTTP status codes, CLI exit paths) share one
//! vocabulary.

use thiserror::Error;

/// Fixed message for every download-gate rejection.
///
/// Wrong passkey, empty candidate, unset passkey and unknown hash all
/// render this same text.
pub const ACCESS_DENIED_MESSAGE: &str = "verification failed";

/// Top-level error type for the proof registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// Content exceeds the registration size limit.
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// A record already exists under this fingerprint.
    #[error("hash already registered: {hash}")]
    AlreadyRegistered { hash: String },

    /// No record (or no stored content) under this fingerprint.
    #[error("{message}: {hash}")]
    NotFound { hash: String, message: String },

    /// The ledger could not be reached or did not answer in time.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// Download passkey check failed.
    #[error("verification failed")]
    AccessDenied,

    /// Caller input could not be interpreted.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Unclassified failure, message preserved.
    #[error("unknown error: {0}")]
    UnknownError(String),
}

impl ProofError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::LedgerUnavailable(_) => "LEDGER_UNAVAILABLE",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::UnknownError(_) => "UNKNOWN_ERROR",
        }
    }

    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LedgerUnavailable(_))
    }
}
