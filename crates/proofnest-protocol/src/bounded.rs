//! Bounded wait around ledger calls.

use std::future::Future;
use std::time::Duration;

use proofnest_core::ProofError;
use proofnest_ledger_client::LedgerError;

/// Default bound on a single ledger call.
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a ledger call, failing with [`ProofError::LedgerUnavailable`] if it
/// does not finish within `limit`.
pub(crate) async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T, ProofError>
where
    F: Future<Output = Result<T, LedgerError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::warn!(op, error = %e, "ledger call failed");
            Err(e.into())
        }
        Err(_) => {
            tracing::warn!(op, timeout_ms = limit.as_millis() as u64, "ledger call timed out");
            Err(ProofError::LedgerUnavailable(format!(
                "{op} did not complete within {limit:?}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let v = bounded(Duration::from_secs(1), "read", async { Ok::<_, LedgerError>(7) })
            .await
            .unwrap();
        assert_eq!(v, 7);
    }

    #[tokio::test]
    async fn expiry_is_ledger_unavailable() {
        let err = bounded(Duration::from_millis(20), "write", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, LedgerError>(())
        })
        .await
        .unwrap_err();
        match err {
            ProofError::LedgerUnavailable(msg) => assert!(msg.contains("write")),
            other => panic!("expected LedgerUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ledger_errors_are_classified() {
        let err = bounded(Duration::from_secs(1), "list", async {
            Err::<(), _>(LedgerError::Unavailable("down".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ProofError::LedgerUnavailable(_)));
    }
}
