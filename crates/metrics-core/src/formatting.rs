use chrono::{DateTime, Utc};

/// Format one line of a ranked count listing, matching the report layout:
/// a 3-wide rank, a 40-wide name column and a 5-wide count.
///
/// # Examples
///
/// ```
/// use metrics_core::formatting::format_count_row;
///
/// assert_eq!(
///     format_count_row(1, "vim-enhanced", 120),
///     "  1. vim-enhanced                             120"
/// );
/// ```
pub fn format_count_row(rank: usize, name: &str, count: u64) -> String {
    format!("{:3}. {:40} {:5}", rank, name, count)
}

/// Format the inclusive reporting period for the summary header.
pub fn format_period(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{} - {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Format a float with two decimal places, as the summary block prints
/// averages.
pub fn format_average(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_count_row_alignment() {
        let row = format_count_row(3, "rhel-edge", 42);
        assert!(row.starts_with("  3. "));
        assert!(row.ends_with("   42"));
        // rank(3) + ". " + name(40) + " " + count(5)
        assert_eq!(row.len(), 3 + 2 + 40 + 1 + 5);
    }

    #[test]
    fn test_format_count_row_long_name_not_truncated() {
        let name = "a".repeat(50);
        let row = format_count_row(1, &name, 7);
        assert!(row.contains(&name));
    }

    #[test]
    fn test_format_period() {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 6, 30, 23, 59, 59).unwrap();
        assert_eq!(
            format_period(start, end),
            "2023-01-01 00:00:00 - 2023-06-30 23:59:59"
        );
    }

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(2.0 / 3.0), "0.67");
        assert_eq!(format_average(0.0), "0.00");
    }
}
