//! Core domain types for the image-builder usage reporting toolkit.
//!
//! Holds the record models, the dump column schema, the shared error type,
//! CLI settings and small formatting helpers. No I/O happens here; the
//! ingestion layer lives in `metrics-data` and the aggregation functions in
//! `metrics-engine`.

pub mod error;
pub mod formatting;
pub mod models;
pub mod schema;
pub mod settings;
pub mod timestamps;

pub use error::{MetricsError, Result};
