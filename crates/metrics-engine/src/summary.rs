//! Whole-table summary statistics and ranked count listings.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use metrics_core::models::{BuildRecord, SubscriptionRecord};

// ── Build summary ─────────────────────────────────────────────────────────────

/// Headline numbers for a set of builds.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Earliest build timestamp in the set.
    pub start: DateTime<Utc>,
    /// Latest build timestamp in the set.
    pub end: DateTime<Utc>,
    pub total_builds: usize,
    pub distinct_users: usize,
    pub builds_with_packages: usize,
    pub builds_with_filesystem: usize,
    pub builds_with_repos: usize,
    /// Mean package-list length over all builds.
    pub avg_packages: f64,
    /// Mean package-list length over builds that selected any packages.
    pub avg_packages_nonempty: f64,
}

/// Summarize a set of builds; `None` when the set is empty.
pub fn summarize(builds: &[BuildRecord]) -> Option<Summary> {
    let start = builds.iter().map(|b| b.created_at).min()?;
    let end = builds.iter().map(|b| b.created_at).max()?;

    let distinct_users = builds
        .iter()
        .map(|b| b.org_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let with_packages = builds.iter().filter(|b| !b.packages.is_empty()).count();
    let package_total: usize = builds.iter().map(|b| b.packages.len()).sum();

    let avg_packages = package_total as f64 / builds.len() as f64;
    let avg_packages_nonempty = if with_packages == 0 {
        0.0
    } else {
        package_total as f64 / with_packages as f64
    };

    Some(Summary {
        start,
        end,
        total_builds: builds.len(),
        distinct_users,
        builds_with_packages: with_packages,
        builds_with_filesystem: builds.iter().filter(|b| !b.filesystem.is_empty()).count(),
        builds_with_repos: builds
            .iter()
            .filter(|b| !b.payload_repositories.is_empty())
            .count(),
        avg_packages,
        avg_packages_nonempty,
    })
}

// ── Ranked listings ───────────────────────────────────────────────────────────

/// The most frequently selected packages, descending by the number of
/// builds that include them. A package counts once per build even when a
/// build lists it twice. Ties break alphabetically.
pub fn frequent_packages(builds: &[BuildRecord], limit: usize) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for build in builds {
        let unique: HashSet<&str> = build.packages.iter().map(String::as_str).collect();
        for pkg in unique {
            *counts.entry(pkg).or_default() += 1;
        }
    }
    ranked(counts, limit)
}

/// Builds per image type, descending.
pub fn image_type_counts(builds: &[BuildRecord]) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for build in builds {
        *counts.entry(build.image_type.as_str()).or_default() += 1;
    }
    ranked(counts, usize::MAX)
}

/// The organizations with the most builds, descending.
pub fn org_build_counts(builds: &[BuildRecord], limit: usize) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for build in builds {
        *counts.entry(build.org_id.as_str()).or_default() += 1;
    }
    ranked(counts, limit)
}

fn ranked(counts: HashMap<&str, u64>, limit: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(limit);
    entries
}

// ── Subscription summary ──────────────────────────────────────────────────────

/// Headline numbers for a deduplicated subscription table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionSummary {
    pub total_instances: usize,
    pub distinct_orgs: usize,
    /// Instances that have checked in at least once.
    pub checked_in: usize,
}

pub fn summarize_subscriptions(records: &[SubscriptionRecord]) -> SubscriptionSummary {
    SubscriptionSummary {
        total_instances: records.len(),
        distinct_orgs: records
            .iter()
            .map(|r| r.org_id.as_str())
            .collect::<HashSet<_>>()
            .len(),
        checked_in: records.iter().filter(|r| r.last_checkin.is_some()).count(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn build(org_id: &str, d: u32, packages: &[&str]) -> BuildRecord {
        BuildRecord {
            id: format!("{}-{}", org_id, d),
            org_id: org_id.to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 5, d, 12, 0, 0).unwrap(),
            image_type: "ami".to_string(),
            packages: packages.iter().map(|s| s.to_string()).collect(),
            filesystem: vec![],
            payload_repositories: vec![],
        }
    }

    // ── summarize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summarize_empty_is_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_summarize_counts() {
        let mut with_fs = build("2", 3, &[]);
        with_fs.filesystem = vec!["/var".to_string()];

        let builds = vec![
            build("1", 1, &["vim", "git"]),
            build("1", 2, &[]),
            with_fs,
        ];
        let summary = summarize(&builds).unwrap();

        assert_eq!(summary.total_builds, 3);
        assert_eq!(summary.distinct_users, 2);
        assert_eq!(summary.builds_with_packages, 1);
        assert_eq!(summary.builds_with_filesystem, 1);
        assert_eq!(summary.builds_with_repos, 0);
        assert_eq!(summary.start.day(), 1);
        assert_eq!(summary.end.day(), 3);
        // 2 packages over 3 builds, 2 over the 1 non-empty build.
        assert!((summary.avg_packages - 2.0 / 3.0).abs() < 1e-9);
        assert!((summary.avg_packages_nonempty - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_all_empty_package_lists() {
        let builds = vec![build("1", 1, &[])];
        let summary = summarize(&builds).unwrap();
        assert_eq!(summary.avg_packages, 0.0);
        assert_eq!(summary.avg_packages_nonempty, 0.0);
    }

    // ── frequent_packages ─────────────────────────────────────────────────────

    #[test]
    fn test_frequent_packages_counts_once_per_build() {
        let builds = vec![
            build("1", 1, &["vim", "vim", "git"]),
            build("2", 2, &["vim"]),
        ];
        let ranked = frequent_packages(&builds, 10);
        assert_eq!(ranked[0], ("vim".to_string(), 2));
        assert_eq!(ranked[1], ("git".to_string(), 1));
    }

    #[test]
    fn test_frequent_packages_respects_limit() {
        let builds = vec![build("1", 1, &["a", "b", "c", "d"])];
        assert_eq!(frequent_packages(&builds, 2).len(), 2);
    }

    #[test]
    fn test_frequent_packages_ties_break_alphabetically() {
        let builds = vec![build("1", 1, &["zeta", "alpha"])];
        let ranked = frequent_packages(&builds, 10);
        assert_eq!(ranked[0].0, "alpha");
        assert_eq!(ranked[1].0, "zeta");
    }

    // ── image_type_counts / org_build_counts ──────────────────────────────────

    #[test]
    fn test_image_type_counts_descending() {
        let mut builds = vec![build("1", 1, &[]), build("1", 2, &[]), build("2", 3, &[])];
        builds[2].image_type = "edge-commit".to_string();
        let counts = image_type_counts(&builds);
        assert_eq!(counts[0], ("ami".to_string(), 2));
        assert_eq!(counts[1], ("edge-commit".to_string(), 1));
    }

    #[test]
    fn test_org_build_counts() {
        let builds = vec![
            build("1", 1, &[]),
            build("1", 2, &[]),
            build("1", 3, &[]),
            build("2", 4, &[]),
        ];
        let counts = org_build_counts(&builds, 10);
        assert_eq!(counts[0], ("1".to_string(), 3));
        assert_eq!(counts[1], ("2".to_string(), 1));
    }

    // ── summarize_subscriptions ───────────────────────────────────────────────

    #[test]
    fn test_summarize_subscriptions() {
        let mk = |uuid: &str, org: &str, checkin: bool| SubscriptionRecord {
            uuid: uuid.to_string(),
            org_id: org.to_string(),
            element: "cloudapi-v2".to_string(),
            created: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            last_checkin: checkin.then(|| Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap()),
        };
        let records = vec![mk("a", "1", true), mk("b", "1", false), mk("c", "2", true)];
        let summary = summarize_subscriptions(&records);
        assert_eq!(summary.total_instances, 3);
        assert_eq!(summary.distinct_orgs, 2);
        assert_eq!(summary.checked_in, 2);
    }

    use chrono::Datelike;
}
