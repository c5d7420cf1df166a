//! Org exclusion and time-range filters.
//!
//! The exclusion set is computed once per run from name patterns matched
//! against the customer directory and then passed explicitly to the filter
//! functions; no per-run global state. All filters return new vectors and
//! leave their input untouched.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use chrono::{DateTime, Utc};
use metrics_core::models::{BuildRecord, Customer, SubscriptionRecord};
use metrics_core::{MetricsError, Result};
use regex::RegexBuilder;
use tracing::debug;

// ── Record access ─────────────────────────────────────────────────────────────

/// A record that belongs to an organization and carries a primary timestamp.
pub trait OrgRecord {
    fn org_id(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
}

impl OrgRecord for BuildRecord {
    fn org_id(&self) -> &str {
        &self.org_id
    }
    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl OrgRecord for SubscriptionRecord {
    fn org_id(&self) -> &str {
        &self.org_id
    }
    fn timestamp(&self) -> DateTime<Utc> {
        self.created
    }
}

// ── Exclusion set ─────────────────────────────────────────────────────────────

/// Read exclusion patterns from a file, one per line; blank lines are
/// skipped.
pub fn read_patterns(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|source| MetricsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut patterns = Vec::new();
    for line in std::io::BufReader::new(file).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            patterns.push(line.trim().to_string());
        }
    }
    Ok(patterns)
}

/// Compute the set of org ids whose directory name matches any of the
/// patterns. Patterns are case-insensitive regexes anchored at the start of
/// the name; empty patterns are skipped. An invalid pattern is an error.
pub fn exclusion_ids(customers: &[Customer], patterns: &[String]) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();

    for pattern in patterns {
        if pattern.is_empty() {
            continue;
        }

        let re = RegexBuilder::new(&format!("^(?:{})", pattern))
            .case_insensitive(true)
            .build()
            .map_err(|source| MetricsError::FilterPattern {
                pattern: pattern.clone(),
                source,
            })?;

        for customer in customers {
            if re.is_match(&customer.org_name) {
                ids.insert(customer.org_id.clone());
            }
        }
    }

    debug!("{} org ids match the exclusion patterns", ids.len());
    Ok(ids)
}

// ── Filters ───────────────────────────────────────────────────────────────────

/// Drop records belonging to any org in `exclude`.
pub fn filter_orgs<T: OrgRecord + Clone>(records: &[T], exclude: &HashSet<String>) -> Vec<T> {
    records
        .iter()
        .filter(|r| !exclude.contains(r.org_id()))
        .cloned()
        .collect()
}

/// Keep records whose timestamp lies in `[start, end]` (inclusive both
/// ends).
pub fn slice_time<T: OrgRecord + Clone>(
    records: &[T],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| r.timestamp() >= start && r.timestamp() <= end)
        .cloned()
        .collect()
}

/// Keep subscription records for the given product element.
pub fn filter_element(records: &[SubscriptionRecord], element: &str) -> Vec<SubscriptionRecord> {
    records
        .iter()
        .filter(|r| r.element == element)
        .cloned()
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn customer(org_id: &str, org_name: &str) -> Customer {
        Customer {
            org_id: org_id.to_string(),
            org_name: org_name.to_string(),
            strategic: String::new(),
        }
    }

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

    // ── exclusion_ids ─────────────────────────────────────────────────────────

    #[test]
    fn test_patterns_match_case_insensitive() {
        let customers = vec![
            customer("1", "Red Hat Internal"),
            customer("2", "Acme Corp"),
        ];
        let ids = exclusion_ids(&customers, &["red hat".to_string()]).unwrap();
        assert_eq!(ids, HashSet::from(["1".to_string()]));
    }

    #[test]
    fn test_patterns_anchor_at_name_start() {
        let customers = vec![
            customer("1", "Internal Red Hat"),
            customer("2", "Red Hat Internal"),
        ];
        // Matches only names that begin with the pattern.
        let ids = exclusion_ids(&customers, &["Red Hat".to_string()]).unwrap();
        assert_eq!(ids, HashSet::from(["2".to_string()]));
    }

    #[test]
    fn test_empty_patterns_are_skipped() {
        let customers = vec![customer("1", "Anyone")];
        let ids = exclusion_ids(&customers, &["".to_string()]).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let customers = vec![customer("1", "Anyone")];
        let err = exclusion_ids(&customers, &["([".to_string()]).unwrap_err();
        assert!(matches!(err, MetricsError::FilterPattern { .. }));
    }

    #[test]
    fn test_multiple_patterns_union() {
        let customers = vec![
            customer("1", "Alpha"),
            customer("2", "Beta"),
            customer("3", "Gamma"),
        ];
        let patterns = vec!["alpha".to_string(), "beta".to_string()];
        let ids = exclusion_ids(&customers, &patterns).unwrap();
        assert_eq!(ids.len(), 2);
    }

    // ── filter_orgs ───────────────────────────────────────────────────────────

    #[test]
    fn test_filter_orgs_drops_excluded() {
        let builds = vec![build("1", 2023, 1, 1), build("2", 2023, 1, 2)];
        let exclude = HashSet::from(["1".to_string()]);
        let kept = filter_orgs(&builds, &exclude);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].org_id, "2");
    }

    #[test]
    fn test_filter_orgs_leaves_input_untouched() {
        let builds = vec![build("1", 2023, 1, 1)];
        let exclude = HashSet::from(["1".to_string()]);
        let _ = filter_orgs(&builds, &exclude);
        assert_eq!(builds.len(), 1);
    }

    // ── slice_time ────────────────────────────────────────────────────────────

    #[test]
    fn test_slice_time_is_inclusive_both_ends() {
        let builds = vec![
            build("1", 2023, 1, 1),
            build("1", 2023, 1, 15),
            build("1", 2023, 1, 31),
        ];
        let start = builds[0].created_at;
        let end = builds[2].created_at;
        assert_eq!(slice_time(&builds, start, end).len(), 3);
    }

    #[test]
    fn test_slice_time_drops_outside_range() {
        let builds = vec![
            build("1", 2022, 12, 31),
            build("1", 2023, 1, 15),
            build("1", 2023, 2, 1),
        ];
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 1, 31, 23, 59, 59).unwrap();
        let kept = slice_time(&builds, start, end);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].org_id, "1");
    }

    // ── filter_element ────────────────────────────────────────────────────────

    #[test]
    fn test_filter_element() {
        let mk = |element: &str| SubscriptionRecord {
            uuid: element.to_string(),
            org_id: "1".to_string(),
            element: element.to_string(),
            created: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            last_checkin: None,
        };
        let records = vec![mk("cloudapi-v2"), mk("on-prem"), mk("cloudapi-v2")];
        let kept = filter_element(&records, "cloudapi-v2");
        assert_eq!(kept.len(), 2);
    }
}
