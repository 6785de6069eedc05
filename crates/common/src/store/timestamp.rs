//! Timestamp helpers for stored records

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Current local time as RFC 3339
pub fn now_timestamp() -> String {
    Local::now().to_rfc3339()
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339, naive ISO-8601 (read as local time) and
/// `YYYY-MM-DD HH:MM:SS`. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Sort key for chronological views; missing or malformed sorts as the epoch
pub fn sort_key(timestamp: Option<&str>) -> DateTime<Utc> {
    timestamp
        .and_then(parse_timestamp)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
