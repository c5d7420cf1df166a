use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Usage reporting for the image-building service
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ibmetrics",
    about = "Usage reporting over image-builder database dumps and subscription exports",
    version
)]
pub struct Settings {
    /// Database dump file to analyse
    pub dump: PathBuf,

    /// Directory of subscription export .tsv files
    #[arg(long)]
    pub subscriptions: Option<PathBuf>,

    /// Customer directory .csv file (org_id,org_name,strategic)
    #[arg(long)]
    pub customers: Option<PathBuf>,

    /// File of org-name exclusion patterns, one regex per line
    #[arg(long)]
    pub filter_file: Option<PathBuf>,

    /// Start of the reporting range (YYYY-MM-DD); defaults to the first record
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// End of the reporting range (YYYY-MM-DD); defaults to the last record
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Window length in days for the build/user count series
    #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..))]
    pub period_days: u32,

    /// Trailing window length in days for the active-user series
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..))]
    pub window_days: u32,

    /// Merge public clouds into "cloud" and private virtualization into
    /// "private-cloud" in the footprint reports
    #[arg(long)]
    pub merge_clouds: bool,

    /// Number of entries shown in the top-N report sections
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Directory where per-metric series files are written
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip the parse cache: always re-parse the dump and write no snapshot
    #[arg(long)]
    pub no_cache: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date \"{}\" (expected YYYY-MM-DD): {}", s, e))
}
