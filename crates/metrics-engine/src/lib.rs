//! Aggregation engine for the image-builder reporting toolkit.
//!
//! Pure functions over immutable build and subscription snapshots: fixed
//! time-window counts, calendar-month user metrics, sliding-window active
//! users, footprint classification and whole-table summaries. Nothing here
//! performs I/O or mutates its input.

pub mod footprints;
pub mod monthly;
pub mod sliding;
pub mod summary;
pub mod windows;

pub use metrics_core as core;
