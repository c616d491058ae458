//! # Caller Identity and Passkeys
//!
//! A [`Principal`] is the opaque identifier an external identity provider
//! hands us for the caller. The registry never interprets it; it is stored
//! as the record's `owner` and echoed back on verification.
//!
//! A [`Passkey`] is the optional date-of-birth string an owner attaches to
//! a record to gate downloads of the stored bytes. It is low-entropy
//! shared knowledge and must not be treated as a credential.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ProofError;

/// Textual form of the anonymous principal issued by the reference
/// identity provider to unauthenticated callers.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

const MAX_PRINCIPAL_LEN: usize = 256;

/// Opaque caller identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Validate and wrap a principal string.
    ///
    /// Surrounding whitespace is trimmed. Empty strings, control characters
    /// and values longer than 256 bytes are rejected.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProofError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProofError::MalformedInput("principal must not be empty".into()));
        }
        if trimmed.len() > MAX_PRINCIPAL_LEN {
            return Err(ProofError::MalformedInput(format!(
                "principal exceeds {MAX_PRINCIPAL_LEN} bytes"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ProofError::MalformedInput(
                "principal contains control characters".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The anonymous principal.
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The caller on whose behalf a registration is made.
///
/// Passed explicitly into every write; there is no ambient session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerSession {
    pub principal: Principal,
}

impl CallerSession {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    /// Session for a caller who presented no identity.
    pub fn anonymous() -> Self {
        Self::new(Principal::anonymous())
    }
}

/// Download passkey (the owner's date of birth in the reference client).
///
/// `Debug` is redacted and the buffer is zeroized on drop. Comparison
/// against a candidate belongs to the download gate, which does it in
/// constant time; the derived `PartialEq` exists for record equality only.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Passkey(String);

impl Passkey {
    /// Wrap a non-empty passkey. Blank input yields `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The stored value, for constant-time comparison and ledger transport.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Passkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passkey([REDACTED])")
    }
}

impl Serialize for Passkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Passkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Passkey::new(raw).ok_or_else(|| serde::de::Error::custom("passkey must not be blank"))
    }
}

/// Deserialize an optional passkey, treating blank strings as absent.
///
/// Some ledgers store an empty string rather than omitting the field.
pub fn deserialize_optional_passkey<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Passkey>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(Passkey::new))
}

/// Placeholder identity values written by recovery tooling when the
/// original owner or filename could not be reconstructed.
const PLACEHOLDER_IDENTITIES: &[&str] = &[
    "",
    "unknown",
    "unknown (file name not recovered)",
    "unknown (recovered)",
];

/// Whether an owner or name field holds a recovery placeholder.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn is_placeholder_identity(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    PLACEHOLDER_IDENTITIES.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_is_trimmed() {
        let p = Principal::new("  aaaaa-aa  ").unwrap();
        assert_eq!(p.as_str(), "aaaaa-aa");
    }

    #[test]
    fn principal_rejects_blank() {
        assert!(Principal::new("   ").is_err());
    }

    #[test]
    fn principal_rejects_control_chars() {
        assert!(Principal::new("abc\u{0007}def").is_err());
    }

    #[test]
    fn principal_rejects_oversized() {
        assert!(Principal::new("x".repeat(MAX_PRINCIPAL_LEN + 1)).is_err());
    }

    #[test]
    fn anonymous_principal_round_trips() {
        let p = Principal::anonymous();
        assert!(p.is_anonymous());
        assert_eq!(p.to_string(), ANONYMOUS_PRINCIPAL);
        assert!(CallerSession::anonymous().principal.is_anonymous());
    }

    #[test]
    fn passkey_debug_is_redacted() {
        let pk = Passkey::new("1990-01-01").unwrap();
        let dbg = format!("{pk:?}");
        assert!(!dbg.contains("1990"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn blank_passkey_is_none() {
        assert!(Passkey::new("").is_none());
        assert!(Passkey::new("  ").is_none());
    }

    #[test]
    fn passkey_serializes_as_plain_string() {
        let pk = Passkey::new("1990-01-01").unwrap();
        assert_eq!(serde_json::to_string(&pk).unwrap(), "\"1990-01-01\"");
        let back: Passkey = serde_json::from_str("\"1990-01-01\"").unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn blank_stored_passkey_reads_as_absent() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_optional_passkey")]
            dob: Option<Passkey>,
        }
        let h: Holder = serde_json::from_str(r#"{"dob": ""}"#).unwrap();
        assert!(h.dob.is_none());
        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(h.dob.is_none());
        let h: Holder = serde_json::from_str(r#"{"dob": "2000-02-02"}"#).unwrap();
        assert_eq!(h.dob.unwrap().expose(), "2000-02-02");
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder_identity("Unknown"));
        assert!(is_placeholder_identity("Unknown (file name not recovered)"));
        assert!(is_placeholder_identity("  unknown (recovered) "));
        assert!(is_placeholder_identity(""));
        assert!(!is_placeholder_identity("note.txt"));
        assert!(!is_placeholder_identity("Unknown Pleasures.mp3"));
    }
}
