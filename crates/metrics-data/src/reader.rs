//! Database dump parsing.
//!
//! Reads the pipe-delimited textual dump of the build table: a header line
//! of column names, a dash separator line, one data line per record and a
//! trailing `(<N> rows)` footer. Produces typed [`BuildRecord`]s according
//! to a declared [`Schema`].

use std::io::BufRead;
use std::path::Path;

use chrono::{DateTime, Utc};
use metrics_core::models::BuildRecord;
use metrics_core::schema::{ColumnType, Schema};
use metrics_core::timestamps::parse_timestamp;
use metrics_core::{MetricsError, Result};
use regex::Regex;
use tracing::{debug, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// Disagreement between the footer's declared row count and the rows that
/// were actually parsed. Non-fatal; the parsed rows are still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountMismatch {
    pub declared: usize,
    pub parsed: usize,
}

/// The result of parsing one dump file.
#[derive(Debug, Clone)]
pub struct DumpReport {
    /// All successfully parsed build records, in file order.
    pub builds: Vec<BuildRecord>,
    /// Set when the footer count disagrees with the parsed row count.
    pub count_mismatch: Option<CountMismatch>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse the dump file at `path` using the given column schema.
///
/// A count mismatch is logged as a warning and recorded in the report; a
/// missing footer or a structurally broken row is a fatal error.
pub fn read_dump(path: &Path, schema: &Schema) -> Result<DumpReport> {
    let file = std::fs::File::open(path).map_err(|source| MetricsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let report = parse_dump(std::io::BufReader::new(file), schema, path)?;

    if let Some(mismatch) = report.count_mismatch {
        warn!(
            "read {} records but row count in dump footer states {} rows",
            mismatch.parsed, mismatch.declared
        );
    }
    debug!("parsed {} build records from {}", report.builds.len(), path.display());

    Ok(report)
}

/// Parse a dump from any buffered reader. `path` is only used in error
/// messages.
pub fn parse_dump<R: BufRead>(input: R, schema: &Schema, path: &Path) -> Result<DumpReport> {
    let footer_re = Regex::new(r"^\(([0-9]+) rows\)$").expect("footer pattern is valid");

    let mut lines = input.lines();

    // First line holds the column names.
    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(MetricsError::MissingFooter {
                path: path.to_path_buf(),
            })
        }
    };
    let names: Vec<String> = split_row(&header).into_iter().map(String::from).collect();

    // Second line is a row of dashes; its content is ignored but an I/O
    // error reading it still propagates.
    match lines.next() {
        Some(line) => {
            line?;
        }
        None => {
            return Err(MetricsError::MissingFooter {
                path: path.to_path_buf(),
            })
        }
    }

    let columns = ColumnIndexes::resolve(&names)?;

    let mut builds: Vec<BuildRecord> = Vec::new();
    let mut declared: Option<usize> = None;

    // Data lines start at line 3 of the file.
    for (offset, line) in lines.enumerate() {
        let line = line?;
        let line_no = offset + 3;

        if let Some(caps) = footer_re.captures(line.trim_end()) {
            // The count always fits: the regex only admits digits.
            declared = caps[1].parse::<usize>().ok();
            break;
        }

        let fields = split_row(&line);
        if fields.len() != names.len() {
            return Err(MetricsError::MalformedRow {
                line: line_no,
                expected: names.len(),
                found: fields.len(),
            });
        }

        let cells = convert_row(&names, &fields, schema, line_no)?;
        builds.push(columns.record_from(&cells, line_no)?);
    }

    let declared = declared.ok_or_else(|| MetricsError::MissingFooter {
        path: path.to_path_buf(),
    })?;

    let count_mismatch = if declared != builds.len() {
        Some(CountMismatch {
            declared,
            parsed: builds.len(),
        })
    } else {
        None
    };

    Ok(DumpReport {
        builds,
        count_mismatch,
    })
}

// ── Cell conversion ───────────────────────────────────────────────────────────

/// One typed cell after schema-driven conversion.
#[derive(Debug, Clone)]
enum Cell {
    Text(String),
    Date(Option<DateTime<Utc>>),
    List(Vec<String>),
}

fn split_row(line: &str) -> Vec<&str> {
    line.split('|').map(str::trim).collect()
}

fn convert_row(
    names: &[String],
    fields: &[&str],
    schema: &Schema,
    line_no: usize,
) -> Result<Vec<Cell>> {
    names
        .iter()
        .zip(fields)
        .map(|(name, raw)| convert_cell(name, raw, schema.column_type(name), line_no))
        .collect()
}

fn convert_cell(name: &str, raw: &str, ty: ColumnType, line_no: usize) -> Result<Cell> {
    match ty {
        ColumnType::Text => Ok(Cell::Text(raw.to_string())),
        ColumnType::Date => {
            if raw == "None" || raw.is_empty() {
                return Ok(Cell::Date(None));
            }
            match parse_timestamp(raw) {
                Some(dt) => Ok(Cell::Date(Some(dt))),
                None => Err(MetricsError::TimestampParse {
                    line: line_no,
                    column: name.to_string(),
                    value: raw.to_string(),
                }),
            }
        }
        ColumnType::List => {
            if raw.is_empty() {
                return Ok(Cell::List(Vec::new()));
            }
            serde_json::from_str::<Vec<String>>(raw)
                .map(Cell::List)
                .map_err(|source| MetricsError::ListParse {
                    line: line_no,
                    column: name.to_string(),
                    source,
                })
        }
    }
}

// ── Record extraction ─────────────────────────────────────────────────────────

/// Header positions of the columns a [`BuildRecord`] is built from.
/// Only `created_at` is required; the rest default to empty when absent.
struct ColumnIndexes {
    id: Option<usize>,
    org_id: Option<usize>,
    created_at: usize,
    image_type: Option<usize>,
    packages: Option<usize>,
    filesystem: Option<usize>,
    payload_repositories: Option<usize>,
}

impl ColumnIndexes {
    fn resolve(names: &[String]) -> Result<Self> {
        let find = |name: &str| names.iter().position(|n| n == name);
        let created_at = find("created_at").ok_or_else(|| {
            MetricsError::Config("dump has no created_at column".to_string())
        })?;
        Ok(Self {
            id: find("id"),
            org_id: find("org_id"),
            created_at,
            image_type: find("image_type"),
            packages: find("packages"),
            filesystem: find("filesystem"),
            payload_repositories: find("payload_repositories"),
        })
    }

    fn record_from(&self, cells: &[Cell], line_no: usize) -> Result<BuildRecord> {
        let created_at = match &cells[self.created_at] {
            Cell::Date(Some(dt)) => *dt,
            // A build without a creation time is a malformed row.
            _ => {
                return Err(MetricsError::TimestampParse {
                    line: line_no,
                    column: "created_at".to_string(),
                    value: "None".to_string(),
                })
            }
        };

        Ok(BuildRecord {
            id: text_at(cells, self.id),
            org_id: text_at(cells, self.org_id),
            created_at,
            image_type: text_at(cells, self.image_type),
            packages: list_at(cells, self.packages),
            filesystem: list_at(cells, self.filesystem),
            payload_repositories: list_at(cells, self.payload_repositories),
        })
    }
}

fn text_at(cells: &[Cell], idx: Option<usize>) -> String {
    match idx.map(|i| &cells[i]) {
        Some(Cell::Text(s)) => s.clone(),
        _ => String::new(),
    }
}

fn list_at(cells: &[Cell], idx: Option<usize>) -> Vec<String> {
    match idx.map(|i| &cells[i]) {
        Some(Cell::List(items)) => items.clone(),
        _ => Vec::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
