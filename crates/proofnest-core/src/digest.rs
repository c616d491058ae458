//! # Content Digest — File Fingerprints
//!
//! A [`ContentDigest`] is the SHA-256 of a file's raw bytes. It is the
//! primary key of every proof record on the ledger and the only lookup key
//! the verifier accepts.
//!
//! The digest depends on the bytes alone. Filename, MIME type and the path
//! the bytes took to reach the hasher (browser, proxy, CLI) never enter the
//! computation, so the same file always yields the same 64-character
//! lowercase hex string.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::ProofError;

/// Length of a rendered digest in hex characters.
pub const HEX_LEN: usize = 64;

/// A SHA-256 content fingerprint.
///
/// Serializes as a bare lowercase hex string, which is the form the ledger
/// and every HTTP surface use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest {
    bytes: [u8; 32],
}

impl ContentDigest {
    /// Wrap a raw 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Fingerprint a byte slice.
    pub fn of(content: &[u8]) -> Self {
        let hash = Sha256::digest(content);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self { bytes }
    }

    /// Parse a caller-supplied fingerprint.
    ///
    /// Surrounding whitespace is ignored and upper-case hex is accepted, so
    /// `" ABCD… "` and `"abcd…"` name the same record. Anything other than
    /// exactly 64 hex characters is [`ProofError::MalformedInput`].
    pub fn parse(input: &str) -> Result<Self, ProofError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ProofError::MalformedInput("hash is required".into()));
        }
        if trimmed.len() != HEX_LEN {
            return Err(ProofError::MalformedInput(format!(
                "hash must be {HEX_LEN} hex characters, got {}",
                trimmed.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(trimmed.to_ascii_lowercase(), &mut bytes)
            .map_err(|e| ProofError::MalformedInput(format!("hash is not valid hex: {e}")))?;
        Ok(Self { bytes })
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Compute the SHA-256 content digest of raw bytes.
pub fn sha256_digest(content: &[u8]) -> ContentDigest {
    ContentDigest::of(content)
}

/// Compute the SHA-256 of raw bytes as lowercase hex.
pub fn sha256_hex(content: &[u8]) -> String {
    ContentDigest::of(content).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_vector_abc() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hex_is_lowercase_and_64_chars() {
        let hex = sha256_hex(b"hello world");
        assert_eq!(hex.len(), HEX_LEN);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn different_inputs_different_digests() {
        assert_ne!(sha256_digest(b"a"), sha256_digest(b"b"));
    }

    #[test]
    fn parse_accepts_uppercase_and_whitespace() {
        let d = sha256_digest(b"note");
        let shouted = format!("  {}\n", d.to_hex().to_uppercase());
        assert_eq!(ContentDigest::parse(&shouted).unwrap(), d);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = ContentDigest::parse("abc123").unwrap_err();
        assert!(matches!(err, ProofError::MalformedInput(_)));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let bad = "z".repeat(HEX_LEN);
        assert!(matches!(
            ContentDigest::parse(&bad),
            Err(ProofError::MalformedInput(_))
        ));
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(ContentDigest::parse("   ").is_err());
    }

    #[test]
    fn serde_uses_bare_hex() {
        let d = sha256_digest(b"abc");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", d.to_hex()));
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn serde_rejects_short_hash() {
        let result: Result<ContentDigest, _> = serde_json::from_str("\"deadbeef\"");
        assert!(result.is_err());
    }

    #[test]
    fn display_matches_to_hex() {
        let d = sha256_digest(b"display");
        assert_eq!(d.to_string(), d.to_hex());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hashing_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
                prop_assert_eq!(sha256_digest(&data), sha256_digest(&data.clone()));
            }

            #[test]
            fn rendered_hex_parses_back(data in proptest::collection::vec(any::<u8>(), 0..512)) {
                let d = sha256_digest(&data);
                prop_assert_eq!(ContentDigest::parse(&d.to_hex()).unwrap(), d);
            }
        }
    }
}
