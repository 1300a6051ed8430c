//! Timestamp and key-column helpers shared by the event tables.
//!
//! Sub-second deduplication is done by storing a truncated column and putting
//! it in the unique constraint, never by range queries.

use chrono::{DateTime, Utc};

/// Microseconds since the epoch.
pub fn to_micros(at: &DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub fn from_micros(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
}

/// Whole seconds since the epoch, rounding toward negative infinity.
pub fn second_bucket(at: &DateTime<Utc>) -> i64 {
    at.timestamp()
}

/// Drops the sub-second part of a timestamp.
pub fn truncate_to_second(at: &DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(*at)
}

/// Key column for an optional identifier. SQL treats NULLs as distinct inside
/// unique constraints, so absent values are stored as the empty string.
pub(crate) fn optional_key<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn parse_optional_key<T: std::str::FromStr>(raw: &str) -> Result<Option<T>, T::Err> {
    if raw.is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}
