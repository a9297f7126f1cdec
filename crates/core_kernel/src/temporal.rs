//! Write timestamps for the append-only ledger
//!
//! Every inserted version row carries a `createdAt` timestamp that orders the
//! row history of a policy. Timestamps are RFC 3339 strings in UTC with
//! microsecond precision; string comparison agrees with chronological order
//! at a fixed precision, which is what the downstream current-view relies on.

use chrono::{DateTime, SecondsFormat, Utc};

/// Returns the current UTC wall-clock time as an RFC 3339 string.
pub fn write_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a timestamp produced by [`write_timestamp`].
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}
