//! Timestamp utilities

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Midnight UTC on the given calendar day
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Parse a timestamp written by this crate (RFC 3339)
pub fn parse_stored(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 6).unwrap();
        let dt = midnight_utc(date);
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 6, 6));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn test_parse_stored_roundtrip() {
        let original = midnight_utc(NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        assert_eq!(parse_stored(&original.to_rfc3339()), Some(original));
        assert_eq!(parse_stored("not a date"), None);
    }
}
