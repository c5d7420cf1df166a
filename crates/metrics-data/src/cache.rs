//! Parse cache for dump snapshots.
//!
//! Parsing a large dump is the slow part of a report run, so the parsed
//! records are serialized to one JSON snapshot per source dump, named after
//! the dump's base name under the user cache root. Read-if-present /
//! write-after-parse, no locking: the tool runs as a single local batch
//! process.

use std::path::{Path, PathBuf};

use metrics_core::models::BuildRecord;
use metrics_core::schema::Schema;
use metrics_core::{MetricsError, Result};
use tracing::{info, warn};

use crate::reader::read_dump;

/// The default cache root: `<user cache dir>/ibmetrics`.
pub fn default_cache_root() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("ibmetrics"))
}

/// Snapshot path for a dump file: `<root>/<dump basename>.json`.
pub fn snapshot_path(root: &Path, dump: &Path) -> PathBuf {
    let stem = dump
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dump".to_string());
    root.join(format!("{}.json", stem))
}

/// Load a snapshot if one exists. A corrupt or unreadable snapshot logs a
/// warning and returns `None` so the caller falls back to re-parsing.
pub fn load_snapshot(path: &Path) -> Option<Vec<BuildRecord>> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read cached snapshot {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(builds) => Some(builds),
        Err(e) => {
            warn!(
                "Cached snapshot {} is corrupt, re-parsing: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// Write a snapshot, creating the cache root if needed.
pub fn store_snapshot(path: &Path, builds: &[BuildRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(builds)?;
    std::fs::write(path, json).map_err(|source| MetricsError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Load the builds for `dump`, using the cache rooted at `cache_root`.
///
/// With `cache_root = None` the cache is bypassed entirely: the dump is
/// re-parsed and no snapshot is written. A footer count mismatch is only
/// observable on a fresh parse; a cached snapshot holds the rows that were
/// parsed when it was written.
pub fn read_builds_cached(
    dump: &Path,
    schema: &Schema,
    cache_root: Option<&Path>,
) -> Result<Vec<BuildRecord>> {
    let snapshot = cache_root.map(|root| snapshot_path(root, dump));

    if let Some(path) = &snapshot {
        if let Some(builds) = load_snapshot(path) {
            info!("Using cached snapshot at {}", path.display());
            return Ok(builds);
        }
    }

    let report = read_dump(dump, schema)?;

    if let Some(path) = &snapshot {
        info!("Saving cached snapshot at {}", path.display());
        if let Err(e) = store_snapshot(path, &report.builds) {
            // Cache writes are best effort; the parse already succeeded.
            warn!("Failed to write snapshot {}: {}", path.display(), e);
        }
    }

    Ok(report.builds)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
