//! Footprint classification and distribution metrics.
//!
//! Every build classifies into a footprint category through the fixed
//! lookup on [`Footprint`]. With `split_cloud = false` the three public
//! clouds report as one `cloud` bucket and the private virtualization
//! targets as `private-cloud`.

use std::collections::{BTreeMap, BTreeSet};

use metrics_core::models::{BuildRecord, Footprint};

/// The footprint label of a build under the chosen cloud grouping.
pub fn footprint_label(build: &BuildRecord, split_cloud: bool) -> &'static str {
    let footprint = Footprint::from_image_type(&build.image_type);
    if split_cloud {
        footprint.label()
    } else {
        footprint.group().label()
    }
}

/// Number of builds per footprint category, sorted by label.
pub fn footprint_counts(builds: &[BuildRecord], split_cloud: bool) -> BTreeMap<&'static str, u64> {
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for build in builds {
        *counts.entry(footprint_label(build, split_cloud)).or_default() += 1;
    }
    counts
}

/// The set of footprint categories each organization's history touches.
pub fn org_footprints(
    builds: &[BuildRecord],
    split_cloud: bool,
) -> BTreeMap<String, BTreeSet<&'static str>> {
    let mut map: BTreeMap<String, BTreeSet<&'static str>> = BTreeMap::new();
    for build in builds {
        map.entry(build.org_id.clone())
            .or_default()
            .insert(footprint_label(build, split_cloud));
    }
    map
}

/// Organizations whose whole build history touches exactly one footprint
/// category, mapped to that category.
pub fn single_footprint_users(
    builds: &[BuildRecord],
    split_cloud: bool,
) -> BTreeMap<String, &'static str> {
    org_footprints(builds, split_cloud)
        .into_iter()
        .filter_map(|(org, feet)| {
            if feet.len() == 1 {
                feet.into_iter().next().map(|foot| (org, foot))
            } else {
                None
            }
        })
        .collect()
}

/// Number of single-footprint organizations per category, sorted by label.
pub fn single_footprint_counts(
    builds: &[BuildRecord],
    split_cloud: bool,
) -> BTreeMap<&'static str, u64> {
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for foot in single_footprint_users(builds, split_cloud).values() {
        *counts.entry(foot).or_default() += 1;
    }
    counts
}

// ── Tests ─────────────────────────────────────────────────────────────────────
