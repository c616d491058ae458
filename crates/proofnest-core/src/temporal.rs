//! # Ledger Timestamps
//!
//! The ledger stamps each record once, at write time. The reference ledger
//! uses nanoseconds since the Unix epoch; other backends and older exports
//! use milliseconds. [`LedgerTimestamp`] normalizes both to milliseconds.
//!
//! Any raw value strictly greater than 10^15 is treated as nanoseconds and
//! divided by 10^6. 10^15 ms is roughly the year 33658, so no plausible
//! millisecond value crosses the threshold, and 10^15 ns is early 1970, so
//! every real nanosecond stamp does.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw values above this are nanoseconds.
pub const NANOSECOND_THRESHOLD: u64 = 1_000_000_000_000_000;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Rendering of an absent or zero timestamp.
pub const UNKNOWN_TIME: &str = "Unknown";

/// Fold a raw ledger value into milliseconds since the epoch.
pub fn normalize_to_millis(raw: u64) -> u64 {
    if raw > NANOSECOND_THRESHOLD {
        raw / NANOS_PER_MILLI
    } else {
        raw
    }
}

/// A ledger timestamp in milliseconds since the Unix epoch.
///
/// Deserializing accepts either unit and normalizes; serializing always
/// emits milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct LedgerTimestamp(u64);

impl LedgerTimestamp {
    /// Normalize a raw ledger value.
    pub fn from_raw(raw: u64) -> Self {
        Self(normalize_to_millis(raw))
    }

    /// Current wall-clock time in nanoseconds, the unit the reference
    /// ledger writes.
    pub fn now_nanos() -> u64 {
        let now = Utc::now();
        now.timestamp_nanos_opt()
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or_else(|| {
                // Outside the i64 nanosecond range (after 2262); fall back to millis.
                u64::try_from(now.timestamp_millis()).unwrap_or(0)
            })
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == 0
    }

    /// Convert to a UTC datetime. `None` for zero or out-of-range values.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if self.is_unknown() {
            return None;
        }
        let millis = i64::try_from(self.0).ok()?;
        DateTime::<Utc>::from_timestamp_millis(millis)
    }

    /// Human-facing rendering: RFC 3339 in UTC, or `Unknown`.
    pub fn display(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => UNKNOWN_TIME.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for LedgerTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::from_raw)
    }
}

impl std::fmt::Display for LedgerTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}
