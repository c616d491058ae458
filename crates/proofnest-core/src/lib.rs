//! # proofnest-core — Foundational Types for the Proof Registry
//!
//! Every other crate in the workspace depends on `proofnest-core`; it
//! depends on nothing internal and performs no I/O.
//!
//! ## Key Design Principles
//!
//! 1. **One fingerprint type.** [`ContentDigest`] is the only way a SHA-256
//!    fingerprint moves through the system. Caller-supplied hex is parsed
//!    and normalized once, at the edge, by [`ContentDigest::parse`].
//!
//! 2. **Ledger time is normalized on read.** The reference ledger stamps
//!    records in nanoseconds. [`LedgerTimestamp`] folds any value above
//!    10^15 down to milliseconds so every consumer sees one unit.
//!
//! 3. **Passkeys never print.** [`Passkey`] redacts itself in `Debug` and
//!    zeroizes on drop. It is a shared-knowledge gate, not a credential.
//!
//! 4. **Closed error taxonomy.** [`ProofError`] is the single error enum
//!    surfaced by the protocol. Presentation layers map it exhaustively.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `proofnest-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod limits;
pub mod record;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::ProofError;
pub use identity::{is_placeholder_identity, CallerSession, Passkey, Principal};
pub use limits::{check_payload, MAX_PAYLOAD_BYTES};
pub use record::{LedgerEntry, ProofRecord, RecordSummary, RoyaltyInfo};
pub use temporal::LedgerTimestamp;
