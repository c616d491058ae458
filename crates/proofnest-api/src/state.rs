//! # Application State
//!
//! Configuration read from the environment and the shared handle every
//! handler receives. The state owns no records; all data lives behind the
//! [`ProofRegistry`]'s ledger.

use std::sync::Arc;
use std::time::Duration;

use proofnest_core::MAX_PAYLOAD_BYTES;
use proofnest_ledger_client::{ConfigError, HttpLedger, LedgerConfig, LedgerError, MemoryLedger};
use proofnest_protocol::ProofRegistry;
use thiserror::Error;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Which ledger the proxy talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerBackend {
    /// Remote ledger over HTTP (`PROOFNEST_LEDGER_URL`).
    #[default]
    Http,
    /// Process-local ledger. Records are lost on restart.
    Memory,
}

impl std::str::FromStr for LedgerBackend {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "memory" => Ok(Self::Memory),
            other => Err(StateError::InvalidVar {
                var: "PROOFNEST_LEDGER_BACKEND",
                reason: format!("unknown backend '{other}', expected 'http' or 'memory'"),
            }),
        }
    }
}

/// Errors building the application state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("invalid {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    #[error("ledger configuration: {0}")]
    LedgerConfig(#[from] ConfigError),

    #[error("ledger client: {0}")]
    Ledger(#[from] LedgerError),
}

/// Proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Largest accepted file field. Never above [`MAX_PAYLOAD_BYTES`].
    pub max_upload_bytes: usize,
    pub ledger_backend: LedgerBackend,
    /// Allowed CORS origins. `*` allows any origin.
    pub cors_allow_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_PAYLOAD_BYTES,
            ledger_backend: LedgerBackend::default(),
            cors_allow_origins: vec!["*".to_string()],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8000)
    /// - `PROOFNEST_MAX_UPLOAD_BYTES` (default: 2 MiB, capped at 2 MiB)
    /// - `PROOFNEST_LEDGER_BACKEND` (`http` | `memory`, default: `http`)
    /// - `CORS_ALLOW_ORIGINS` (comma-separated, default: `*`)
    pub fn from_env() -> Result<Self, StateError> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("PORT") {
            config.port = raw.trim().parse().map_err(|_| StateError::InvalidVar {
                var: "PORT",
                reason: format!("'{raw}' is not a port number"),
            })?;
        }

        if let Ok(raw) = std::env::var("PROOFNEST_MAX_UPLOAD_BYTES") {
            let limit: usize = raw.trim().parse().map_err(|_| StateError::InvalidVar {
                var: "PROOFNEST_MAX_UPLOAD_BYTES",
                reason: format!("'{raw}' is not a byte count"),
            })?;
            if limit == 0 {
                return Err(StateError::InvalidVar {
                    var: "PROOFNEST_MAX_UPLOAD_BYTES",
                    reason: "must be greater than zero".into(),
                });
            }
            if limit > MAX_PAYLOAD_BYTES {
                tracing::warn!(
                    requested = limit,
                    cap = MAX_PAYLOAD_BYTES,
                    "upload limit above the registration limit, capping"
                );
            }
            config.max_upload_bytes = limit.min(MAX_PAYLOAD_BYTES);
        }

        if let Ok(raw) = std::env::var("PROOFNEST_LEDGER_BACKEND") {
            config.ledger_backend = raw.parse()?;
        }

        if let Ok(raw) = std::env::var("CORS_ALLOW_ORIGINS") {
            let origins: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
            if !origins.is_empty() {
                config.cors_allow_origins = origins;
            }
        }

        Ok(config)
    }
}

/// Shared state handed to every handler. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: ProofRegistry,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State over a fresh in-memory ledger with default configuration.
    pub fn new() -> Self {
        let config = AppConfig {
            ledger_backend: LedgerBackend::Memory,
            ..AppConfig::default()
        };
        Self::with_registry(config, ProofRegistry::new(Arc::new(MemoryLedger::new())))
    }

    pub fn with_registry(config: AppConfig, registry: ProofRegistry) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    /// Build the registry the configuration asks for.
    ///
    /// The HTTP backend reads its own settings with
    /// [`LedgerConfig::from_env`]; its timeout also bounds each protocol call.
    pub fn from_config(config: AppConfig) -> Result<Self, StateError> {
        let registry = match config.ledger_backend {
            LedgerBackend::Memory => {
                tracing::warn!("using in-memory ledger, records will not survive a restart");
                ProofRegistry::new(Arc::new(MemoryLedger::new()))
            }
            LedgerBackend::Http => {
                let ledger_config = LedgerConfig::from_env()?;
                tracing::info!(ledger = ?ledger_config, "using HTTP ledger");
                let timeout = Duration::from_secs(ledger_config.timeout_secs);
                ProofRegistry::new(Arc::new(HttpLedger::new(ledger_config)?)).with_timeout(timeout)
            }
        };
        Ok(Self::with_registry(config, registry))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("HTTP".parse::<LedgerBackend>().unwrap(), LedgerBackend::Http);
        assert_eq!(" memory ".parse::<LedgerBackend>().unwrap(), LedgerBackend::Memory);
        assert!("postgres".parse::<LedgerBackend>().is_err());
    }

    #[test]
    fn default_config_allows_full_payload() {
        let config = AppConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_upload_bytes, MAX_PAYLOAD_BYTES);
        assert_eq!(config.cors_allow_origins, vec!["*"]);
    }

    #[test]
    fn new_state_uses_memory_ledger() {
        let state = AppState::new();
        assert_eq!(state.registry.backend(), "memory");
        assert_eq!(state.config.ledger_backend, LedgerBackend::Memory);
    }
}
