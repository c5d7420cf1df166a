use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a timestamp string from a dump or export into a UTC [`DateTime`].
///
/// Accepts RFC 3339 (with `Z` or an offset) as well as the naive
/// `YYYY-MM-DD HH:MM:SS[.ffffff]` form that database dumps use; naive values
/// are interpreted as UTC. A bare `YYYY-MM-DD` parses as midnight.
/// Returns `None` for empty strings, the literal `"None"`, or anything
/// unrecognised.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() || s == "None" {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const FMTS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for fmt in FMTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_rfc3339_z_suffix() {
        let dt = parse_timestamp("2023-05-01T10:30:00Z").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_timestamp("2023-05-01T12:00:00+02:00").unwrap();
        // 12:00 +02:00 = 10:00 UTC
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_naive_dump_format() {
        let dt = parse_timestamp("2023-05-01 08:15:30.123456").unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 15);
    }

    #[test]
    fn test_parse_naive_without_fraction() {
        assert!(parse_timestamp("2023-05-01 08:15:30").is_some());
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let dt = parse_timestamp("2023-05-01").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn test_parse_none_literal_returns_none() {
        assert!(parse_timestamp("None").is_none());
    }

    #[test]
    fn test_parse_empty_returns_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_timestamp("not-a-date").is_none());
    }
}
