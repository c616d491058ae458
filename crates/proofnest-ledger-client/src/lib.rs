//! # proofnest-ledger-client — Ledger Collaborator
//!
//! The proof registry keeps no state of its own. Every record lives on an
//! append-only ledger reached through the [`Ledger`] trait:
//!
//! - [`MemoryLedger`]: in-process, for tests and single-node deployments.
//! - [`HttpLedger`]: reqwest client for a remote ledger service such as
//!   `proofnest-ledger-stub`.
//!
//! Both enforce first-writer-wins per hash and stamp records at write time.

pub mod config;
pub mod error;
pub mod http;
pub mod ledger;
pub mod memory;
pub mod retry;

pub use config::{ConfigError, LedgerConfig};
pub use error::LedgerError;
pub use http::HttpLedger;
pub use ledger::{Ledger, WriteOutcome};
pub use memory::MemoryLedger;
pub use retry::RetryPolicy;
