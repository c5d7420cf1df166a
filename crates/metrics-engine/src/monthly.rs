//! Calendar-month and seven-day-period user metrics.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use metrics_core::models::BuildRecord;

/// First day of the calendar month a timestamp falls in; the key for all
/// monthly series.
pub fn month_of(dt: DateTime<Utc>) -> NaiveDate {
    let date = dt.date_naive();
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("first of month is valid")
}

/// Number of builds per calendar month, sorted by month.
pub fn monthly_builds(builds: &[BuildRecord]) -> Vec<(NaiveDate, u64)> {
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for build in builds {
        *counts.entry(month_of(build.created_at)).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Number of distinct organizations seen in each calendar month.
pub fn monthly_users(builds: &[BuildRecord]) -> Vec<(NaiveDate, u64)> {
    let mut orgs: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();
    for build in builds {
        orgs.entry(month_of(build.created_at))
            .or_default()
            .insert(build.org_id.as_str());
    }
    orgs.into_iter()
        .map(|(month, set)| (month, set.len() as u64))
        .collect()
}

/// Number of organizations whose earliest build falls in each month.
///
/// Summed over all months of a range, this equals the number of distinct
/// organizations with at least one build in that range.
pub fn monthly_new_users(builds: &[BuildRecord]) -> Vec<(NaiveDate, u64)> {
    let mut earliest: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for build in builds {
        earliest
            .entry(build.org_id.as_str())
            .and_modify(|t| {
                if build.created_at < *t {
                    *t = build.created_at;
                }
            })
            .or_insert(build.created_at);
    }

    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    // Months with users but no new users still report zero.
    for build in builds {
        counts.entry(month_of(build.created_at)).or_default();
    }
    for first_seen in earliest.values() {
        *counts.entry(month_of(*first_seen)).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Organizations seen in each month that also appear in a strictly earlier
/// month.
pub fn monthly_returning_users(builds: &[BuildRecord]) -> Vec<(NaiveDate, u64)> {
    let users = monthly_users(builds);
    let new = monthly_new_users(builds);
    users
        .into_iter()
        .zip(new)
        .map(|((month, total), (_, fresh))| (month, total - fresh))
        .collect()
}

/// Users per consecutive seven-day period, with the number of first-time
/// users in each. Periods start at the first record's timestamp; they are
/// not aligned to calendar weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyUsers {
    pub start: DateTime<Utc>,
    pub users: u64,
    pub new_users: u64,
}

pub fn weekly_users(builds: &[BuildRecord]) -> Vec<WeeklyUsers> {
    let Some(first) = builds.iter().map(|b| b.created_at).min() else {
        return Vec::new();
    };
    let last = builds
        .iter()
        .map(|b| b.created_at)
        .max()
        .expect("non-empty builds have a max");

    let mut seen_so_far: HashSet<&str> = HashSet::new();
    let mut series = Vec::new();

    let mut p_start = first;
    while p_start <= last {
        let p_end = p_start + Duration::days(7);
        let week_users: HashSet<&str> = builds
            .iter()
            .filter(|b| b.created_at >= p_start && b.created_at < p_end)
            .map(|b| b.org_id.as_str())
            .collect();

        let new_users = week_users.difference(&seen_so_far).count() as u64;

        series.push(WeeklyUsers {
            start: p_start,
            users: week_users.len() as u64,
            new_users,
        });

        seen_so_far.extend(week_users);
        p_start = p_end;
    }

    series
}

// ── Tests ─────────────────────────────────────────────────────────────────────
