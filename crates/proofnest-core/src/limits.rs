//! Payload limits.

use crate::error::ProofError;

/// Maximum accepted content size: 2 MiB.
pub const MAX_PAYLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Validate a payload before any ledger interaction.
///
/// Empty content is [`ProofError::MalformedInput`]. Content larger than
/// [`MAX_PAYLOAD_BYTES`] is [`ProofError::PayloadTooLarge`]. Exactly
/// `MAX_PAYLOAD_BYTES` is accepted.
pub fn check_payload(content: &[u8]) -> Result<(), ProofError> {
    if content.is_empty() {
        return Err(ProofError::MalformedInput("file content is empty".into()));
    }
    if content.len() > MAX_PAYLOAD_BYTES {
        return Err(ProofError::PayloadTooLarge {
            size: content.len(),
            limit: MAX_PAYLOAD_BYTES,
        });
    }
    Ok(())
}
