//! Fixed-window counting over the build history.
//!
//! The time axis from `start` to `end` is tiled with non-overlapping
//! windows of a fixed period; each window counts builds (or distinct
//! organizations) with `window_start <= created_at < window_start + period`.
//! Windows with no records still appear with a zero count.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use metrics_core::models::BuildRecord;

/// One window of the counted series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Inclusive start of the window.
    pub start: DateTime<Utc>,
    pub count: u64,
}

/// Count builds per window of `period` length over `[start, end]`.
///
/// The last window may extend past `end` so that every record in the range
/// is counted; the window series always sums to the number of records
/// between `start` and `end` when the input is pre-sliced to that range.
pub fn builds_over_time(
    builds: &[BuildRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    period: Duration,
) -> Vec<WindowCount> {
    windows(start, end, period, |w_start, w_end| {
        builds
            .iter()
            .filter(|b| b.created_at >= w_start && b.created_at < w_end)
            .count() as u64
    })
}

/// Count distinct organizations per window of `period` length.
pub fn users_over_time(
    builds: &[BuildRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    period: Duration,
) -> Vec<WindowCount> {
    windows(start, end, period, |w_start, w_end| {
        builds
            .iter()
            .filter(|b| b.created_at >= w_start && b.created_at < w_end)
            .map(|b| b.org_id.as_str())
            .collect::<HashSet<_>>()
            .len() as u64
    })
}

fn windows(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    period: Duration,
    count_fn: impl Fn(DateTime<Utc>, DateTime<Utc>) -> u64,
) -> Vec<WindowCount> {
    assert!(period > Duration::zero(), "window period must be positive");

    let mut series = Vec::new();
    let mut t = start;
    while t <= end {
        series.push(WindowCount {
            start: t,
            count: count_fn(t, t + period),
        });
        t += period;
    }
    series
}

// ── Tests ─────────────────────────────────────────────────────────────────────
