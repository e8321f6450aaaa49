//! Second-precision UTC timestamps.
//!
//! Every timestamp the service emits is RFC 3339 / ISO-8601 UTC truncated
//! to whole seconds, and every record written in one refresh cycle carries
//! the exact same value.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};

/// Current UTC time truncated to whole seconds.
pub fn utc_now_seconds() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Format a timestamp as second-precision RFC 3339
/// (e.g. `2024-05-01T12:00:00+00:00`).
pub fn to_second_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Serde adapter enforcing the second-precision wire format.
///
/// Usage: `#[serde(with = "atlas_domain::time::second_precision")]`
pub mod second_precision {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_second_iso(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
