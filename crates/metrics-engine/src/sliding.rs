//! Sliding-window active-user metrics.
//!
//! For every calendar day D in the data range, the sliding series counts
//! distinct organizations with at least one build in the trailing window
//! `(D - window_days, D]`. The window advances incrementally with an
//! occupancy map instead of re-filtering the whole table per day, so the
//! cost stays near-linear in the number of records.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use metrics_core::models::BuildRecord;

/// Distinct organizations per day in the trailing `window_days`-day window
/// ending at that day (inclusive).
pub fn users_sliding_window(builds: &[BuildRecord], window_days: u32) -> Vec<(NaiveDate, u64)> {
    let mut events: Vec<(NaiveDate, &str)> = builds
        .iter()
        .map(|b| (b.created_at.date_naive(), b.org_id.as_str()))
        .collect();
    events.sort();

    let Some(&(first_day, _)) = events.first() else {
        return Vec::new();
    };
    let (last_day, _) = *events.last().expect("non-empty after first()");

    let window = Duration::days(i64::from(window_days));
    let mut occupancy: HashMap<&str, u64> = HashMap::new();
    let mut enter = 0usize;
    let mut leave = 0usize;
    let mut series = Vec::new();

    let mut day = first_day;
    while day <= last_day {
        // Admit builds up to and including this day.
        while enter < events.len() && events[enter].0 <= day {
            *occupancy.entry(events[enter].1).or_default() += 1;
            enter += 1;
        }
        // Evict builds that fell out of the trailing window.
        while leave < events.len() && events[leave].0 <= day - window {
            let org = events[leave].1;
            if let Some(n) = occupancy.get_mut(org) {
                *n -= 1;
                if *n == 0 {
                    occupancy.remove(org);
                }
            }
            leave += 1;
        }

        series.push((day, occupancy.len() as u64));
        day += Duration::days(1);
    }

    series
}

/// Distinct organizations active on each day of the data range; days with
/// no builds report zero.
pub fn daily_users(builds: &[BuildRecord]) -> Vec<(NaiveDate, u64)> {
    // A 1-day trailing window is exactly the per-day distinct count.
    users_sliding_window(builds, 1)
}

/// Daily active organizations divided by the 30-day sliding count ending on
/// the same day. An empty window reports 0.0.
pub fn dau_over_mau(builds: &[BuildRecord]) -> Vec<(NaiveDate, f64)> {
    let monthly = users_sliding_window(builds, 30);
    let daily = daily_users(builds);

    daily
        .into_iter()
        .zip(monthly)
        .map(|((day, dau), (_, mau))| {
            let ratio = if mau == 0 {
                0.0
            } else {
                dau as f64 / mau as f64
            };
            (day, ratio)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn build(org_id: &str, y: i32, m: u32, d: u32) -> BuildRecord {
        BuildRecord {
            id: format!("{}-{}-{}-{}", org_id, y, m, d),
            org_id: org_id.to_string(),
            created_at: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            image_type: "ami".to_string(),
            packages: vec![],
            filesystem: vec![],
            payload_repositories: vec![],
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Reference implementation: filter the whole table per day.
    fn sliding_naive(builds: &[BuildRecord], window_days: u32) -> Vec<(NaiveDate, u64)> {
        let days: Vec<NaiveDate> = builds.iter().map(|b| b.created_at.date_naive()).collect();
        let Some(&first) = days.iter().min() else {
            return Vec::new();
        };
        let last = *days.iter().max().unwrap();

        let mut series = Vec::new();
        let mut d = first;
        while d <= last {
            let lower = d - Duration::days(i64::from(window_days));
            let count = builds
                .iter()
                .filter(|b| {
                    let bd = b.created_at.date_naive();
                    bd > lower && bd <= d
                })
                .map(|b| b.org_id.as_str())
                .collect::<HashSet<_>>()
                .len() as u64;
            series.push((d, count));
            d += Duration::days(1);
        }
        series
    }

    #[test]
    fn test_sliding_window_counts_trailing_orgs() {
        let builds = vec![
            build("1", 2023, 5, 1),
            build("2", 2023, 5, 10),
            build("1", 2023, 5, 20),
        ];
        let series = users_sliding_window(&builds, 30);

        // One entry per day from the first to the last build.
        assert_eq!(series.len(), 20);
        assert_eq!(series[0], (day(2023, 5, 1), 1));
        // By May 10 both orgs are in the window.
        assert_eq!(series[9], (day(2023, 5, 10), 2));
        assert_eq!(series[19], (day(2023, 5, 20), 2));
    }

    #[test]
    fn test_sliding_window_evicts_old_builds() {
        let builds = vec![build("1", 2023, 5, 1), build("2", 2023, 6, 20)];
        let series = users_sliding_window(&builds, 30);

        // On June 1 (day 31), org 1's May 1 build has left the 30-day window.
        let june_1 = series
            .iter()
            .find(|(d, _)| *d == day(2023, 6, 1))
            .expect("June 1 in range");
        assert_eq!(june_1.1, 0);

        let june_20 = series.last().unwrap();
        assert_eq!(*june_20, (day(2023, 6, 20), 1));
    }

    #[test]
    fn test_sliding_window_matches_naive_filter() {
        // Unsorted, multi-org input across several weeks.
        let builds = vec![
            build("3", 2023, 5, 18),
            build("1", 2023, 5, 1),
            build("2", 2023, 5, 10),
            build("1", 2023, 5, 10),
            build("2", 2023, 6, 2),
            build("1", 2023, 6, 25),
            build("4", 2023, 6, 25),
        ];
        for window in [1, 7, 30] {
            assert_eq!(
                users_sliding_window(&builds, window),
                sliding_naive(&builds, window),
                "window = {} days",
                window
            );
        }
    }

    #[test]
    fn test_sliding_window_empty_input() {
        assert!(users_sliding_window(&[], 30).is_empty());
    }

    #[test]
    fn test_daily_users_zero_on_quiet_days() {
        let builds = vec![build("1", 2023, 5, 1), build("1", 2023, 5, 3)];
        let series = daily_users(&builds);
        assert_eq!(
            series,
            vec![
                (day(2023, 5, 1), 1),
                (day(2023, 5, 2), 0),
                (day(2023, 5, 3), 1),
            ]
        );
    }

    #[test]
    fn test_dau_over_mau_ratio() {
        let builds = vec![
            build("1", 2023, 5, 1),
            build("2", 2023, 5, 1),
            build("1", 2023, 5, 2),
        ];
        let series = dau_over_mau(&builds);

        // May 1: 2 daily / 2 monthly.
        assert_eq!(series[0].0, day(2023, 5, 1));
        assert!((series[0].1 - 1.0).abs() < f64::EPSILON);
        // May 2: 1 daily / 2 monthly.
        assert!((series[1].1 - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dau_over_mau_never_exceeds_one() {
        let builds = vec![
            build("1", 2023, 5, 1),
            build("2", 2023, 5, 8),
            build("3", 2023, 5, 15),
            build("1", 2023, 5, 15),
        ];
        for (_, ratio) in dau_over_mau(&builds) {
            assert!((0.0..=1.0).contains(&ratio));
        }
    }
}
