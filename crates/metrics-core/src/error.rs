use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the reporting toolkit.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be created or written to disk.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dump ended before a `(<N> rows)` footer line was seen.
    #[error("Dump {path} is missing its row-count footer")]
    MissingFooter { path: PathBuf },

    /// A data line did not have one field per header column.
    #[error("Malformed row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A required timestamp cell could not be parsed.
    #[error("Invalid timestamp \"{value}\" in column {column} at line {line}")]
    TimestampParse {
        line: usize,
        column: String,
        value: String,
    },

    /// A list-valued cell was not a JSON array of strings.
    #[error("Invalid list cell in column {column} at line {line}: {source}")]
    ListParse {
        line: usize,
        column: String,
        #[source]
        source: serde_json::Error,
    },

    /// The customer directory holds more than one row for an org id.
    #[error("Duplicate org_id {org_id} in customer directory ({count} rows)")]
    DuplicateOrgId { org_id: String, count: usize },

    /// A customer-directory row is missing a required column.
    #[error("Customer directory row {line} has {found} columns, expected {expected}")]
    CustomerRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// An org-name exclusion pattern is not a valid regex.
    #[error("Invalid filter pattern \"{pattern}\": {source}")]
    FilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the workspace crates.
pub type Result<T> = std::result::Result<T, MetricsError>;
