//! # proofnest-ledger-stub
//!
//! In-memory implementation of the ledger endpoints that
//! `proofnest-ledger-client` calls. Records are stamped in nanoseconds,
//! like the production ledger, and enforce first-writer-wins per hash.
//!
//! Storage is in-memory (DashMap) with no persistence; data is lost on
//! restart.

pub mod routes;
pub mod store;

pub use routes::{router, MAX_RECORD_BODY_BYTES};
pub use store::AppState;
