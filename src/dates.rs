//! ISO-8601 conversion at the API boundary.
//!
//! Timestamps travel as strings on the wire and as `DateTime<Utc>` inside.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Parse a caller-supplied calendar timestamp.
///
/// Accepted forms:
/// - RFC 3339 with offset: `2024-03-01T10:00:00+02:00`, `2024-03-01T08:00:00.000Z`
/// - Local date-time, read as UTC: `2024-03-01T08:00:00` (fractional seconds allowed)
/// - Bare date, read as UTC midnight: `2024-03-01`
///
/// # Errors
///
/// Returns `Error::Validation` for anything else.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(Error::Validation(format!(
        "Invalid date '{}': expected ISO-8601 (YYYY-MM-DD or RFC 3339)",
        input
    )))
}

/// Render a timestamp as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn to_iso(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
