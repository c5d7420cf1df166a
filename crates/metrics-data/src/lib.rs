//! Data ingestion layer for the image-builder reporting toolkit.
//!
//! Responsible for parsing database dumps, loading and deduplicating
//! subscription exports, reading the customer directory, applying the org
//! and time-range filters, and caching parsed snapshots between runs.

pub mod cache;
pub mod customers;
pub mod filters;
pub mod reader;
pub mod subscriptions;

pub use metrics_core as core;
