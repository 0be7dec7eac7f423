//! Timestamp helpers.

use chrono::{DateTime, Utc};

use crate::error::DomainError;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Parses an RFC 3339 timestamp as stored by the engine.
///
/// ```
/// use chrono::Datelike;
/// use whatif_domain::common::parse_datetime;
///
/// let dt = parse_datetime("2024-01-15T10:30:00Z").unwrap();
/// assert_eq!(dt.year(), 2024);
/// assert!(parse_datetime("yesterday").is_err());
/// ```
///
/// # Errors
///
/// Returns `DomainError::Parse` naming the offending value.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::parse(format!("Invalid timestamp '{}': {}", s, e)))
}

/// Whole days between two instants, rounded up, ignoring direction.
///
/// Any partial day counts as a full one, so one millisecond apart is 1 day
/// and identical instants are 0.
pub fn day_count(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let elapsed = (to - from).num_milliseconds().abs();
    (elapsed + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn parses_offsets_into_utc() {
        let dt = parse_datetime("2024-01-15T12:30:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn rejects_non_rfc3339() {
        let err = parse_datetime("2024-01-15").unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));
    }

    #[test]
    fn day_count_rounds_up() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(day_count(start, start), 0);
        assert_eq!(day_count(start, start + Duration::milliseconds(1)), 1);
        assert_eq!(day_count(start, start + Duration::days(1)), 1);
        assert_eq!(day_count(start, start + Duration::hours(25)), 2);
    }

    #[test]
    fn day_count_ignores_direction() {
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let earlier = start - Duration::hours(36);
        assert_eq!(day_count(start, earlier), 2);
    }
}
