//! Typed client for a remote ledger service.
//!
//! ## Wire protocol
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/v1/records` | Write entry. 201 `{hash, timestamp}`, 409 `{error, hash}` |
//! | GET    | `/v1/records/{hash}` | Read record. 200 record, 404 absent |
//! | GET    | `/v1/records` | List records |
//! | GET    | `/health` | Liveness |
//!
//! Bodies are camelCase JSON; record content is base64.

use std::time::Duration;

use async_trait::async_trait;
use proofnest_core::{ContentDigest, LedgerEntry, ProofRecord};
use serde::Deserialize;
use url::Url;

use crate::config::{ConfigError, LedgerConfig};
use crate::error::LedgerError;
use crate::ledger::{Ledger, WriteOutcome};
use crate::retry::RetryPolicy;

const RECORDS_PATH: &str = "v1/records";

/// Body of a successful write.
#[derive(Debug, Deserialize)]
struct WriteReceipt {
    timestamp: u64,
}

/// Body of a 409 write.
#[derive(Debug, Deserialize)]
struct ConflictBody {
    #[serde(default)]
    hash: Option<String>,
}

/// Ledger reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl HttpLedger {
    /// Create a client from configuration.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| LedgerError::Config(ConfigError::InvalidToken))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LedgerError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the transport retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn send_get(&self, endpoint: &str, url: &str) -> Result<reqwest::Response, LedgerError> {
        self.retry
            .send(endpoint, || self.http.get(url).send())
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.into(),
                source: e,
            })
    }
}

async fn api_error(endpoint: &str, resp: reqwest::Response) -> LedgerError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    LedgerError::ApiError {
        endpoint: endpoint.into(),
        status,
        body,
    }
}

#[async_trait]
impl Ledger for HttpLedger {
    fn backend(&self) -> &'static str {
        "http"
    }

    async fn write(&self, entry: LedgerEntry) -> Result<WriteOutcome, LedgerError> {
        let endpoint = "POST /v1/records";
        let url = self.url(RECORDS_PATH);

        // Single attempt: a retry after a lost response would see its own
        // write as a conflict.
        let resp = self
            .http
            .post(&url)
            .json(&entry)
            .send()
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::CONFLICT {
            let existing = resp
                .json::<ConflictBody>()
                .await
                .ok()
                .and_then(|body| body.hash)
                .and_then(|h| ContentDigest::parse(&h).ok())
                .unwrap_or(entry.hash);
            return Ok(WriteOutcome::Conflict { existing });
        }

        if !resp.status().is_success() {
            return Err(api_error(endpoint, resp).await);
        }

        let receipt: WriteReceipt = resp.json().await.map_err(|e| LedgerError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })?;
        Ok(WriteOutcome::Written {
            timestamp: receipt.timestamp,
        })
    }

    async fn read(&self, hash: &ContentDigest) -> Result<Option<ProofRecord>, LedgerError> {
        let endpoint = format!("GET /v1/records/{hash}");
        let url = self.url(&format!("{RECORDS_PATH}/{hash}"));

        let resp = self.send_get(&endpoint, &url).await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            return Err(api_error(&endpoint, resp).await);
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| LedgerError::Deserialization {
                endpoint,
                source: e,
            })
    }

    async fn list(&self) -> Result<Vec<ProofRecord>, LedgerError> {
        let endpoint = "GET /v1/records";
        let url = self.url(RECORDS_PATH);

        let resp = self.send_get(endpoint, &url).await?;

        if !resp.status().is_success() {
            return Err(api_error(endpoint, resp).await);
        }

        resp.json().await.map_err(|e| LedgerError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }

    async fn health(&self) -> Result<(), LedgerError> {
        let endpoint = "GET /health";
        let url = self.url("health");

        let resp = self.send_get(endpoint, &url).await?;
        if !resp.status().is_success() {
            return Err(api_error(endpoint, resp).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let ledger = HttpLedger::new(LedgerConfig::local_mock(9100).unwrap()).unwrap();
        assert_eq!(ledger.url(RECORDS_PATH), "http://127.0.0.1:9100/v1/records");
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let config = LedgerConfig::new("https://ledger.example.com/registry/", 5).unwrap();
        let ledger = HttpLedger::new(config).unwrap();
        assert_eq!(
            ledger.url("health"),
            "https://ledger.example.com/registry/health"
        );
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let config = LedgerConfig::local_mock(9100).unwrap().with_token("bad\ntoken");
        assert!(matches!(
            HttpLedger::new(config),
            Err(LedgerError::Config(ConfigError::InvalidToken))
        ));
    }
}
