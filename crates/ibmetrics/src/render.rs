//! Text report sections and per-metric CSV series files.
//!
//! Report sections are built as strings so they can be asserted on in
//! tests; `main` prints them to stdout. Series files carry the raw numbers
//! behind each section for further processing, one CSV per metric named
//! `<dump basename>-<metric>.csv`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use metrics_core::formatting::{format_average, format_count_row, format_period};
use metrics_core::models::Customer;
use metrics_data::customers::org_name;
use metrics_engine::monthly::WeeklyUsers;
use metrics_engine::summary::{Summary, SubscriptionSummary};
use metrics_engine::windows::WindowCount;
use std::collections::BTreeMap;
use tracing::info;

// ── Text sections ──────────────────────────────────────────────────────────────

/// The headline summary block.
pub fn summary_section(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str("Summary\n");
    out.push_str("-------\n");
    out.push_str(&format!(
        "Period:                    {}\n",
        format_period(summary.start, summary.end)
    ));
    out.push_str(&format!(
        "Total builds:              {}\n",
        summary.total_builds
    ));
    out.push_str(&format!(
        "Distinct users:            {}\n",
        summary.distinct_users
    ));
    out.push_str(&format!(
        "Builds with packages:      {}\n",
        summary.builds_with_packages
    ));
    out.push_str(&format!(
        "Builds with filesystem:    {}\n",
        summary.builds_with_filesystem
    ));
    out.push_str(&format!(
        "Builds with custom repos:  {}\n",
        summary.builds_with_repos
    ));
    out.push_str(&format!(
        "Avg packages per build:    {}\n",
        format_average(summary.avg_packages)
    ));
    out.push_str(&format!(
        "Avg packages (non-empty):  {}\n",
        format_average(summary.avg_packages_nonempty)
    ));
    out
}

/// A titled ranked listing of (name, count) rows.
pub fn ranked_section(title: &str, entries: &[(String, u64)]) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');
    for (rank, (name, count)) in entries.iter().enumerate() {
        out.push_str(&format_count_row(rank + 1, name, *count));
        out.push('\n');
    }
    out
}

/// The biggest-organizations listing, with org ids resolved to customer
/// names where the directory knows them.
pub fn org_section(
    title: &str,
    entries: &[(String, u64)],
    customers: &[Customer],
) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');
    for (rank, (org_id, count)) in entries.iter().enumerate() {
        let label = match org_name(customers, org_id) {
            Some(name) => format!("{} ({})", name, org_id),
            None => org_id.clone(),
        };
        out.push_str(&format_count_row(rank + 1, &label, *count));
        out.push('\n');
    }
    out
}

/// Footprint distribution: builds per category, then organizations whose
/// whole history stays in one category.
pub fn footprint_section(
    build_counts: &BTreeMap<&'static str, u64>,
    single_user_counts: &BTreeMap<&'static str, u64>,
) -> String {
    let mut out = String::new();
    out.push_str("Footprints\n");
    out.push_str("----------\n");
    out.push_str("Builds per footprint:\n");
    for (rank, (label, count)) in build_counts.iter().enumerate() {
        out.push_str(&format_count_row(rank + 1, label, *count));
        out.push('\n');
    }
    out.push_str("Single-footprint users:\n");
    for (rank, (label, count)) in single_user_counts.iter().enumerate() {
        out.push_str(&format_count_row(rank + 1, label, *count));
        out.push('\n');
    }
    out
}

/// The subscription block.
pub fn subscription_section(summary: &SubscriptionSummary) -> String {
    let mut out = String::new();
    out.push_str("Subscriptions\n");
    out.push_str("-------------\n");
    out.push_str(&format!(
        "Total instances:           {}\n",
        summary.total_instances
    ));
    out.push_str(&format!(
        "Distinct orgs:             {}\n",
        summary.distinct_orgs
    ));
    out.push_str(&format!(
        "Checked in at least once:  {}\n",
        summary.checked_in
    ));
    out
}

// ── Series files ───────────────────────────────────────────────────────────────

/// Path of the series file for `metric`: `<output_dir>/<dump stem>-<metric>.csv`.
pub fn series_path(output_dir: &Path, dump: &Path, metric: &str) -> PathBuf {
    let stem = dump
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dump".to_string());
    output_dir.join(format!("{}-{}.csv", stem, metric))
}

fn write_csv<I: IntoIterator<Item = String>>(
    path: &Path,
    header: &str,
    rows: I,
) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", header)?;
    for row in rows {
        writeln!(out, "{}", row)?;
    }
    out.flush()?;
    info!("Saved series {}", path.display());
    Ok(())
}

/// A fixed-window count series (builds or users over time).
pub fn write_window_series(path: &Path, series: &[WindowCount]) -> std::io::Result<()> {
    write_csv(
        path,
        "window_start,count",
        series
            .iter()
            .map(|w| format!("{},{}", w.start.format("%Y-%m-%dT%H:%M:%SZ"), w.count)),
    )
}

/// A per-day or per-month count series.
pub fn write_dated_series(
    path: &Path,
    value_column: &str,
    series: &[(NaiveDate, u64)],
) -> std::io::Result<()> {
    write_csv(
        path,
        &format!("date,{}", value_column),
        series.iter().map(|(date, count)| format!("{},{}", date, count)),
    )
}

/// The per-day DAU/MAU ratio series.
pub fn write_ratio_series(path: &Path, series: &[(NaiveDate, f64)]) -> std::io::Result<()> {
    write_csv(
        path,
        "date,dau_over_mau",
        series
            .iter()
            .map(|(date, ratio)| format!("{},{:.4}", date, ratio)),
    )
}

/// The seven-day user periods with their new-user counts.
pub fn write_weekly_users(path: &Path, series: &[WeeklyUsers]) -> std::io::Result<()> {
    write_csv(
        path,
        "period_start,users,new_users",
        series.iter().map(|w| {
            format!(
                "{},{},{}",
                w.start.format("%Y-%m-%dT%H:%M:%SZ"),
                w.users,
                w.new_users
            )
        }),
    )
}

/// Footprint category counts.
pub fn write_footprint_counts(
    path: &Path,
    counts: &BTreeMap<&'static str, u64>,
) -> std::io::Result<()> {
    write_csv(
        path,
        "footprint,count",
        counts.iter().map(|(label, count)| format!("{},{}", label, count)),
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
