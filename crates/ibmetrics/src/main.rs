//! Usage reporting over image-builder database dumps and subscription
//! exports.
//!
//! The pipeline is load, filter, aggregate, render: parse the dump (cache
//! aware), drop excluded organizations, slice the reporting range, then
//! print the text report to stdout and write one CSV series file per
//! metric next to it.

mod bootstrap;
mod render;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use clap::Parser;
use metrics_core::models::{BuildRecord, Customer};
use metrics_core::schema::build_schema;
use metrics_core::settings::Settings;
use metrics_data::{cache, customers, filters, subscriptions};
use metrics_engine::{footprints, monthly, sliding, summary, windows};
use tracing::{info, warn};

/// Subscription element tracked by the report.
const SUBSCRIPTION_ELEMENT: &str = "cloudapi-v2";

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level)?;
    info!("ibmetrics v{}", env!("CARGO_PKG_VERSION"));

    run(&settings)
}

fn run(settings: &Settings) -> anyhow::Result<()> {
    // ── Load ──────────────────────────────────────────────────────────────

    let customer_dir: Vec<Customer> = match &settings.customers {
        Some(path) => customers::read_customers(path)
            .with_context(|| format!("reading customer directory {}", path.display()))?,
        None => Vec::new(),
    };

    let exclude = match &settings.filter_file {
        Some(path) => {
            let patterns = filters::read_patterns(path)
                .with_context(|| format!("reading filter file {}", path.display()))?;
            filters::exclusion_ids(&customer_dir, &patterns)?
        }
        None => Default::default(),
    };
    if !exclude.is_empty() {
        info!("Excluding {} organizations", exclude.len());
    }

    let cache_root = if settings.no_cache {
        None
    } else {
        cache::default_cache_root()
    };
    let builds = cache::read_builds_cached(&settings.dump, &build_schema(), cache_root.as_deref())
        .with_context(|| format!("reading dump {}", settings.dump.display()))?;
    println!("Imported {} records from {}", builds.len(), settings.dump.display());

    // ── Filter ────────────────────────────────────────────────────────────

    let builds = filters::filter_orgs(&builds, &exclude);
    println!("{} records after user filtering", builds.len());

    let Some((start, end)) = reporting_range(settings, &builds) else {
        warn!("No records to report on");
        return Ok(());
    };

    let builds = filters::slice_time(&builds, start, end);
    println!(
        "{} records between {} and {}",
        builds.len(),
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    );
    println!();

    // ── Aggregate and render ──────────────────────────────────────────────

    if let Some(headline) = summary::summarize(&builds) {
        print!("{}", render::summary_section(&headline));
        println!();
    }

    print!(
        "{}",
        render::ranked_section(
            "Most frequent packages",
            &summary::frequent_packages(&builds, settings.limit),
        )
    );
    println!();

    print!(
        "{}",
        render::ranked_section("Image types", &summary::image_type_counts(&builds))
    );
    println!();

    print!(
        "{}",
        render::org_section(
            "Biggest organizations",
            &summary::org_build_counts(&builds, settings.limit),
            &customer_dir,
        )
    );
    println!();

    let split_cloud = !settings.merge_clouds;
    let build_feet = footprints::footprint_counts(&builds, split_cloud);
    let single_feet = footprints::single_footprint_counts(&builds, split_cloud);
    print!("{}", render::footprint_section(&build_feet, &single_feet));
    println!();

    write_series(settings, &builds, start, end, &build_feet)?;

    // ── Subscriptions ─────────────────────────────────────────────────────

    if let Some(dir) = &settings.subscriptions {
        // Already deduplicated by UUID at load time.
        let records = subscriptions::read_subscriptions(dir)
            .with_context(|| format!("reading subscription exports in {}", dir.display()))?;
        let records = filters::filter_element(&records, SUBSCRIPTION_ELEMENT);
        let records = filters::filter_orgs(&records, &exclude);
        let records = filters::slice_time(&records, start, end);
        println!(
            "{} subscribed instances between {} and {}",
            records.len(),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        print!(
            "{}",
            render::subscription_section(&summary::summarize_subscriptions(&records))
        );
    }

    Ok(())
}

/// The inclusive reporting range: explicit `--start`/`--end` dates when
/// given, otherwise the first and last record timestamps. `None` when
/// there is nothing to derive a default from.
fn reporting_range(
    settings: &Settings,
    builds: &[BuildRecord],
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = match settings.start {
        Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
        None => builds.iter().map(|b| b.created_at).min()?,
    };
    // An explicit end date covers that whole day, including fractional
    // seconds inside 23:59:59.
    let end = match settings.end {
        Some(date) => {
            (date + Duration::days(1)).and_time(NaiveTime::MIN).and_utc()
                - Duration::nanoseconds(1)
        }
        None => builds.iter().map(|b| b.created_at).max()?,
    };
    Some((start, end))
}

/// Write the per-metric CSV series files next to the text report.
fn write_series(
    settings: &Settings,
    builds: &[BuildRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    footprint_counts: &std::collections::BTreeMap<&'static str, u64>,
) -> anyhow::Result<()> {
    let out = &settings.output_dir;
    let dump = &settings.dump;
    std::fs::create_dir_all(out)
        .with_context(|| format!("creating output directory {}", out.display()))?;

    let period = Duration::days(i64::from(settings.period_days));

    render::write_window_series(
        &render::series_path(out, dump, "builds"),
        &windows::builds_over_time(builds, start, end, period),
    )?;
    render::write_window_series(
        &render::series_path(out, dump, "users"),
        &windows::users_over_time(builds, start, end, period),
    )?;

    render::write_dated_series(
        &render::series_path(out, dump, "monthly-builds"),
        "builds",
        &monthly::monthly_builds(builds),
    )?;
    render::write_dated_series(
        &render::series_path(out, dump, "monthly-users"),
        "users",
        &monthly::monthly_users(builds),
    )?;
    render::write_dated_series(
        &render::series_path(out, dump, "monthly-new-users"),
        "new_users",
        &monthly::monthly_new_users(builds),
    )?;
    render::write_dated_series(
        &render::series_path(out, dump, "monthly-returning-users"),
        "returning_users",
        &monthly::monthly_returning_users(builds),
    )?;
    render::write_weekly_users(
        &render::series_path(out, dump, "weekly-users"),
        &monthly::weekly_users(builds),
    )?;

    render::write_dated_series(
        &render::series_path(out, dump, "sliding-users"),
        "users",
        &sliding::users_sliding_window(builds, settings.window_days),
    )?;
    render::write_dated_series(
        &render::series_path(out, dump, "daily-users"),
        "users",
        &sliding::daily_users(builds),
    )?;
    render::write_ratio_series(
        &render::series_path(out, dump, "dau-over-mau"),
        &sliding::dau_over_mau(builds),
    )?;

    render::write_footprint_counts(
        &render::series_path(out, dump, "footprints"),
        footprint_counts,
    )?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
