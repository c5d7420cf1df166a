//! Subscription export loading and deduplication.
//!
//! Exports are tab-separated files, one per batch, with a header line of
//! column names and the literal `None` for missing values. All `.tsv` files
//! directly under the export directory are concatenated in sorted filename
//! order and deduplicated by instance UUID.

use std::collections::HashMap;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use metrics_core::models::SubscriptionRecord;
use metrics_core::timestamps::parse_timestamp;
use metrics_core::{MetricsError, Result};
use tracing::{debug, warn};

// ── File discovery ────────────────────────────────────────────────────────────

/// Find all `.tsv` files directly under `dir`, sorted by path.
/// Subdirectories are not traversed.
pub fn find_tsv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Subscription directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "tsv")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Read and deduplicate all subscription exports under `dir`.
///
/// A missing directory or an empty one yields an empty table with a
/// warning, never an error. Rows that cannot be parsed are skipped with a
/// warning; structural problems in one file do not abort the load.
pub fn read_subscriptions(dir: &Path) -> Result<Vec<SubscriptionRecord>> {
    let files = find_tsv_files(dir);
    if files.is_empty() {
        warn!("No .tsv files found in {}", dir.display());
        return Ok(Vec::new());
    }

    let mut records: Vec<SubscriptionRecord> = Vec::new();
    for path in &files {
        let file = std::fs::File::open(path).map_err(|source| MetricsError::FileRead {
            path: path.clone(),
            source,
        })?;
        records.extend(read_export(std::io::BufReader::new(file), path)?);
    }

    debug!(
        "loaded {} subscription records from {} files",
        records.len(),
        files.len()
    );

    Ok(deduplicate(records))
}

/// Parse a single tab-separated export. `path` is only used in messages.
pub fn read_export<R: BufRead>(input: R, path: &Path) -> Result<Vec<SubscriptionRecord>> {
    let mut lines = input.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Ok(Vec::new()),
    };
    let names: Vec<&str> = header.split('\t').map(str::trim).collect();
    let find = |name: &str| names.iter().position(|n| *n == name);

    let (Some(uuid_idx), Some(org_idx), Some(element_idx), Some(created_idx)) = (
        find("uuid"),
        find("org_id"),
        find("element"),
        find("created"),
    ) else {
        warn!(
            "export {} is missing a required column; skipping file",
            path.display()
        );
        return Ok(Vec::new());
    };
    let checkin_idx = find("lastcheckin");

    let mut records = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != names.len() {
            warn!(
                "skipping row {} of {}: {} fields, expected {}",
                offset + 2,
                path.display(),
                fields.len(),
                names.len()
            );
            continue;
        }

        let Some(created) = parse_timestamp(fields[created_idx]) else {
            warn!(
                "skipping row {} of {}: unparseable created time \"{}\"",
                offset + 2,
                path.display(),
                fields[created_idx]
            );
            continue;
        };

        records.push(SubscriptionRecord {
            uuid: fields[uuid_idx].to_string(),
            org_id: fields[org_idx].to_string(),
            element: fields[element_idx].to_string(),
            created,
            last_checkin: checkin_idx.and_then(|i| parse_timestamp(fields[i])),
        });
    }

    Ok(records)
}

// ── Deduplication ─────────────────────────────────────────────────────────────

/// Deduplicate subscription records by UUID.
///
/// Exact-duplicate rows are dropped first. Among remaining records sharing
/// a UUID, the one with the maximum `last_checkin` survives (`None` never
/// beats `Some`); on a tie the first record in input order is kept, which
/// is deterministic because files are concatenated in sorted filename
/// order. The surviving record keeps the position of the UUID's first
/// occurrence.
pub fn deduplicate(records: Vec<SubscriptionRecord>) -> Vec<SubscriptionRecord> {
    let mut seen_rows: HashSet<SubscriptionRecord> = HashSet::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<SubscriptionRecord> = Vec::new();

    for record in records {
        // Identical rows are dropped outright.
        if !seen_rows.insert(record.clone()) {
            continue;
        }

        match position.get(&record.uuid) {
            Some(&idx) => {
                if record.last_checkin > kept[idx].last_checkin {
                    kept[idx] = record;
                }
            }
            None => {
                position.insert(record.uuid.clone(), kept.len());
                kept.push(record);
            }
        }
    }

    kept
}

// ── Tests ─────────────────────────────────────────────────────────────────────
