//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, the UTC timestamp stamped into export envelopes as
//! `created_at`. Always rendered as `YYYY-MM-DDTHH:MM:SSZ`: no sub-seconds,
//! no `+00:00`, always `Z`.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SubboxError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string, accepting any offset and converting to UTC.
    pub fn parse(s: &str) -> Result<Self, SubboxError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| SubboxError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn test_parse_converts_offset() {
        let ts = Timestamp::parse("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_serde_uses_z_suffix() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2026-01-15T12:00:00Z\"");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
