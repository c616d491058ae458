//! Ledger client configuration.
//!
//! Points the HTTP ledger client at a ledger service. Defaults target a
//! ledger stub on localhost. Override via environment variables or explicit
//! construction.

use url::Url;
use zeroize::Zeroizing;

/// Default ledger endpoint (the bundled ledger stub).
pub const DEFAULT_LEDGER_URL: &str = "http://127.0.0.1:8090";

/// Default bound on a single ledger call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to a ledger service.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct LedgerConfig {
    /// Base URL of the ledger service.
    pub base_url: Url,
    /// Optional bearer token sent on every request.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PROOFNEST_LEDGER_URL` (default: `http://127.0.0.1:8090`)
    /// - `PROOFNEST_LEDGER_TOKEN` (optional)
    /// - `PROOFNEST_LEDGER_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("PROOFNEST_LEDGER_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);

        Ok(Self {
            base_url: env_url("PROOFNEST_LEDGER_URL", DEFAULT_LEDGER_URL)?,
            api_token,
            timeout_secs: env_timeout("PROOFNEST_LEDGER_TIMEOUT_SECS")?,
        })
    }

    /// Build a configuration for an explicit URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("0".into()));
        }
        Ok(Self {
            base_url: Url::parse(base_url)
                .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?,
            api_token: None,
            timeout_secs,
        })
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Zeroizing::new(token.into()));
        self
    }

    /// Create a configuration pointing to a local mock server (for testing).
    pub fn local_mock(port: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: Url::parse(&format!("http://127.0.0.1:{port}"))
                .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?,
            api_token: None,
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn env_timeout(var: &str) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidTimeout(raw)),
        },
        Err(_) => Ok(DEFAULT_TIMEOUT_SECS),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid ledger timeout {0:?}: must be a positive number of seconds")]
    InvalidTimeout(String),
    #[error("ledger token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = LedgerConfig::local_mock(9000).unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:9000/");
        assert!(cfg.api_token.is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = LedgerConfig::local_mock(9000).unwrap().with_token("super-secret");
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn new_rejects_zero_timeout() {
        assert!(matches!(
            LedgerConfig::new("http://localhost:1", 0),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn new_rejects_bad_url() {
        assert!(matches!(
            LedgerConfig::new("not a url", 5),
            Err(ConfigError::InvalidUrl(_, _))
        ));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("NONEXISTENT_VAR_PROOFNEST_1", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn env_timeout_defaults_and_validates() {
        assert_eq!(
            env_timeout("NONEXISTENT_VAR_PROOFNEST_2").unwrap(),
            DEFAULT_TIMEOUT_SECS
        );
        std::env::set_var("TEST_BAD_TIMEOUT_PN", "soon");
        let result = env_timeout("TEST_BAD_TIMEOUT_PN");
        std::env::remove_var("TEST_BAD_TIMEOUT_PN");
        assert!(result.is_err());
    }
}
