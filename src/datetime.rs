//! Date/time helpers for Cabinet.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a SQLite `datetime('now')` value (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn parse_db_datetime(datetime_str: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Convert a database datetime string to RFC3339.
///
/// Values that do not parse are returned unchanged.
pub fn to_rfc3339(datetime_str: &str) -> String {
    parse_db_datetime(datetime_str)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| datetime_str.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rfc3339() {
        assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_to_rfc3339_passthrough() {
        assert_eq!(to_rfc3339("not a date"), "not a date");
    }

    #[test]
    fn test_parse_db_datetime() {
        let dt = parse_db_datetime("2024-01-15 10:30:00").unwrap();
        assert_eq!(dt.timestamp(), 1705314600);
        assert!(parse_db_datetime("2024-01-15").is_none());
    }
}
