//! Ledger connection flags shared by every networked subcommand.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use proofnest_ledger_client::config::{DEFAULT_LEDGER_URL, DEFAULT_TIMEOUT_SECS};
use proofnest_ledger_client::{HttpLedger, LedgerConfig};
use proofnest_protocol::ProofRegistry;

#[derive(Args, Debug, Clone)]
pub struct LedgerArgs {
    /// Base URL of the ledger service.
    #[arg(long, global = true, env = "PROOFNEST_LEDGER_URL", default_value = DEFAULT_LEDGER_URL)]
    pub ledger_url: String,

    /// Bearer token for the ledger service.
    #[arg(long, global = true, env = "PROOFNEST_LEDGER_TOKEN", hide_env_values = true)]
    pub ledger_token: Option<String>,

    /// Seconds to wait for each ledger call.
    #[arg(long, global = true, env = "PROOFNEST_LEDGER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl LedgerArgs {
    /// Build a registry over the configured HTTP ledger.
    pub fn connect(&self) -> Result<ProofRegistry> {
        let mut config = LedgerConfig::new(&self.ledger_url, self.timeout)
            .with_context(|| format!("invalid ledger settings for {}", self.ledger_url))?;
        if let Some(token) = self.ledger_token.as_deref().filter(|t| !t.trim().is_empty()) {
            config = config.with_token(token);
        }
        tracing::debug!(ledger = ?config, "connecting");
        let ledger = HttpLedger::new(config).context("failed to build ledger client")?;
        Ok(ProofRegistry::new(Arc::new(ledger)).with_timeout(Duration::from_secs(self.timeout)))
    }
}
