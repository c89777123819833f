//! Date formatting helpers.

use chrono::{DateTime, Utc};
use transcript_types::Timestamp;

fn to_datetime(ts: Timestamp) -> DateTime<Utc> {
    i64::try_from(ts.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
}

/// "19 October 2026": the form printed on certificates.
pub fn format_long_date(ts: Timestamp) -> String {
    to_datetime(ts).format("%-d %B %Y").to_string()
}

/// "2026-10-19T08:30:00Z": the form returned by the API.
pub fn format_rfc3339(ts: Timestamp) -> String {
    to_datetime(ts).format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// PDF date string, e.g. "D:20261019083000Z".
pub fn pdf_date(ts: Timestamp) -> String {
    to_datetime(ts).format("D:%Y%m%d%H%M%SZ").to_string()
}
