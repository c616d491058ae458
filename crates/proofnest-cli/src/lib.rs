//! # proofnest-cli — Command-Line Client for the Proof Registry
//!
//! Provides the `proofnest` binary. Every subcommand except `hash` talks
//! to a ledger through the same [`proofnest_protocol::ProofRegistry`] the
//! HTTP proxy uses.
//!
//! ## Subcommands
//!
//! - `proofnest hash` — SHA-256 fingerprint of local files. No ledger.
//! - `proofnest register` — Register a file.
//! - `proofnest verify` — Look up a fingerprint or a file.
//! - `proofnest download` — Fetch stored bytes with the owner's passkey.
//! - `proofnest files` — Search and page through registered proofs.
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Error (I/O, ledger unavailable, malformed input) |
//! | 3 | Already registered |
//! | 4 | Not found |
//! | 5 | Access denied |

pub mod connection;
pub mod download;
pub mod files;
pub mod hash;
pub mod register;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use proofnest_core::{ProofError, MAX_PAYLOAD_BYTES};

pub const EXIT_OK: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_ALREADY_REGISTERED: u8 = 3;
pub const EXIT_NOT_FOUND: u8 = 4;
pub const EXIT_ACCESS_DENIED: u8 = 5;

/// Read a file for registration or verification.
///
/// Files over the registration limit are refused from metadata, before
/// reading.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    let meta = std::fs::metadata(path).with_context(|| format!("cannot stat {}", path.display()))?;
    let size = usize::try_from(meta.len()).unwrap_or(usize::MAX);
    if size > MAX_PAYLOAD_BYTES {
        return Err(ProofError::PayloadTooLarge {
            size,
            limit: MAX_PAYLOAD_BYTES,
        }
        .into());
    }
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Exit code for a protocol error that ends a command.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ProofError>() {
        Some(ProofError::AlreadyRegistered { .. }) => EXIT_ALREADY_REGISTERED,
        Some(ProofError::NotFound { .. }) => EXIT_NOT_FOUND,
        Some(ProofError::AccessDenied) => EXIT_ACCESS_DENIED,
        _ => EXIT_ERROR,
    }
}
